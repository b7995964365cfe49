use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::Result,
    models::application::{Application, ApplicationStatus},
};

/// A helper function to map a `tokio_postgres::Row` to an `Application`.
fn row_to_application(row: &Row) -> Result<Application> {
    Ok(Application {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        seeker_id: row.try_get("seeker_id")?,
        cover_letter: row.try_get("cover_letter")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Creates a new application in the submitted state.
pub async fn create(
    pool: &Pool,
    id: Uuid,
    job_id: Uuid,
    seeker_id: Uuid,
    cover_letter: String,
) -> Result<Application> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO applications (id, job_id, seeker_id, cover_letter)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
            &[&id, &job_id, &seeker_id, &cover_letter],
        )
        .await?;
    row_to_application(&row)
}

/// Finds an application by its ID.
pub async fn find_by_id(pool: &Pool, application_id: &Uuid) -> Result<Option<Application>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM applications
            WHERE id = $1
            "#,
            &[application_id],
        )
        .await?;
    row.map(|r| row_to_application(&r)).transpose()
}

/// Finds a seeker's application to a specific job, if any.
pub async fn find_by_job_and_seeker(
    pool: &Pool,
    job_id: &Uuid,
    seeker_id: &Uuid,
) -> Result<Option<Application>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM applications
            WHERE job_id = $1 AND seeker_id = $2
            "#,
            &[job_id, seeker_id],
        )
        .await?;
    row.map(|r| row_to_application(&r)).transpose()
}

/// Lists a seeker's applications, newest first.
pub async fn list_for_seeker(pool: &Pool, seeker_id: &Uuid) -> Result<Vec<Application>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM applications
            WHERE seeker_id = $1
            ORDER BY created_at DESC
            "#,
            &[seeker_id],
        )
        .await?;
    rows.iter().map(row_to_application).collect()
}

/// Lists the applications to a job posting, oldest first (review order).
pub async fn list_for_job(pool: &Pool, job_id: &Uuid) -> Result<Vec<Application>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM applications
            WHERE job_id = $1
            ORDER BY created_at ASC
            "#,
            &[job_id],
        )
        .await?;
    rows.iter().map(row_to_application).collect()
}

/// Moves an application to a new review state and returns the updated row.
pub async fn update_status(
    pool: &Pool,
    application_id: &Uuid,
    status: ApplicationStatus,
) -> Result<Application> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            UPDATE applications
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
            &[&status, application_id],
        )
        .await?;
    row_to_application(&row)
}
