use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::repositories::application as application_repo;
use crate::repositories::job as job_repo;

/// Submits a seeker's application to an open posting.
///
/// A seeker can apply to a posting at most once; a closed posting accepts no
/// further applications.
pub async fn apply(
    db: &Pool,
    seeker_id: Uuid,
    job_id: Uuid,
    cover_letter: String,
) -> Result<Application> {
    let job = job_repo::find_by_id(db, &job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !job.is_open {
        return Err(AppError::Validation(
            "This job is no longer accepting applications".to_string(),
        ));
    }

    if application_repo::find_by_job_and_seeker(db, &job_id, &seeker_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    let application =
        application_repo::create(db, Uuid::new_v4(), job_id, seeker_id, cover_letter).await?;

    tracing::info!(
        "✅ Application {} submitted to job {} by seeker {}",
        application.id,
        job_id,
        seeker_id
    );
    Ok(application)
}

/// Lists a seeker's own applications.
pub async fn applications_for_seeker(db: &Pool, seeker_id: Uuid) -> Result<Vec<Application>> {
    application_repo::list_for_seeker(db, &seeker_id).await
}

/// Lists the applications to a posting the employer owns.
pub async fn applications_for_job(
    db: &Pool,
    employer_id: Uuid,
    job_id: Uuid,
) -> Result<Vec<Application>> {
    let job = job_repo::find_by_id(db, &job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if job.employer_id != employer_id {
        return Err(AppError::Unauthorized);
    }

    application_repo::list_for_job(db, &job_id).await
}

/// Moves an application to a new review state, on behalf of the employer
/// owning the posting.
pub async fn review(
    db: &Pool,
    employer_id: Uuid,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<Application> {
    if status == ApplicationStatus::Submitted {
        return Err(AppError::Validation(
            "An application cannot be moved back to submitted".to_string(),
        ));
    }

    let application = application_repo::find_by_id(db, &application_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let job = job_repo::find_by_id(db, &application.job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if job.employer_id != employer_id {
        return Err(AppError::Unauthorized);
    }

    let updated = application_repo::update_status(db, &application_id, status).await?;
    tracing::info!(
        "✅ Application {} moved to {:?} by employer {}",
        application_id,
        status,
        employer_id
    );
    Ok(updated)
}
