use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::job::Job;
use crate::repositories::job::{self as job_repo, JobFilter};

/// The fields of a new job posting.
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
}

/// Creates a posting owned by the given employer.
pub async fn create_job(db: &Pool, employer_id: Uuid, new_job: NewJob) -> Result<Job> {
    let job = job_repo::create(
        db,
        Uuid::new_v4(),
        employer_id,
        new_job.title,
        new_job.description,
        new_job.location,
        new_job.category,
        new_job.salary_min,
        new_job.salary_max,
    )
    .await?;

    tracing::info!("✅ Job posted: {} by employer {}", job.id, employer_id);
    Ok(job)
}

/// Lists open postings with optional filters.
pub async fn list_open_jobs(db: &Pool, filter: &JobFilter) -> Result<Vec<Job>> {
    job_repo::list_open(db, filter).await
}

/// Lists an employer's own postings.
pub async fn list_employer_jobs(db: &Pool, employer_id: Uuid) -> Result<Vec<Job>> {
    job_repo::list_for_employer(db, &employer_id).await
}

/// Fetches a posting by ID.
pub async fn get_job(db: &Pool, job_id: Uuid) -> Result<Job> {
    job_repo::find_by_id(db, &job_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Loads a posting and checks the employer owns it.
async fn owned_job(db: &Pool, employer_id: Uuid, job_id: Uuid) -> Result<Job> {
    let job = job_repo::find_by_id(db, &job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if job.employer_id != employer_id {
        return Err(AppError::Unauthorized);
    }

    Ok(job)
}

/// Closes an employer's own posting to further applications.
pub async fn close_job(db: &Pool, employer_id: Uuid, job_id: Uuid) -> Result<()> {
    owned_job(db, employer_id, job_id).await?;
    job_repo::close(db, &job_id).await?;
    tracing::info!("✅ Job closed: {}", job_id);
    Ok(())
}

/// Deletes an employer's own posting and its applications.
pub async fn delete_job(db: &Pool, employer_id: Uuid, job_id: Uuid) -> Result<()> {
    owned_job(db, employer_id, job_id).await?;
    job_repo::delete(db, &job_id).await?;
    tracing::info!("✅ Job deleted: {}", job_id);
    Ok(())
}

/// Removes any posting, regardless of owner. Moderation path.
pub async fn remove_job(db: &Pool, job_id: Uuid) -> Result<()> {
    job_repo::find_by_id(db, &job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    job_repo::delete(db, &job_id).await?;
    tracing::info!("✅ Job removed by moderation: {}", job_id);
    Ok(())
}
