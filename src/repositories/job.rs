use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use uuid::Uuid;
use crate::{
    error::Result,
    models::job::Job,
};

/// A helper function to map a `tokio_postgres::Row` to a `Job`.
fn row_to_job(row: &Row) -> Result<Job> {
    Ok(Job {
        id: row.try_get("id")?,
        employer_id: row.try_get("employer_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        category: row.try_get("category")?,
        salary_min: row.try_get("salary_min")?,
        salary_max: row.try_get("salary_max")?,
        is_open: row.try_get("is_open")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Creates a new job posting.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &Pool,
    id: Uuid,
    employer_id: Uuid,
    title: String,
    description: String,
    location: String,
    category: String,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
) -> Result<Job> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO jobs (id, employer_id, title, description, location, category, salary_min, salary_max)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
            &[
                &id,
                &employer_id,
                &title,
                &description,
                &location,
                &category,
                &salary_min,
                &salary_max,
            ],
        )
        .await?;
    row_to_job(&row)
}

/// Finds a job posting by its ID.
pub async fn find_by_id(pool: &Pool, job_id: &Uuid) -> Result<Option<Job>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM jobs
            WHERE id = $1
            "#,
            &[job_id],
        )
        .await?;
    row.map(|r| row_to_job(&r)).transpose()
}

/// Optional filters for the public job listing.
#[derive(Default)]
pub struct JobFilter {
    pub category: Option<String>,
    pub location: Option<String>,
    pub q: Option<String>,
}

/// Lists open job postings, newest first, applying any filters.
pub async fn list_open(pool: &Pool, filter: &JobFilter) -> Result<Vec<Job>> {
    let client = pool.get().await?;

    let mut query = String::from("SELECT * FROM jobs WHERE is_open = true");
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
    let search_pattern;

    if let Some(category) = &filter.category {
        params.push(category);
        query.push_str(&format!(" AND category = ${}", params.len()));
    }

    if let Some(location) = &filter.location {
        params.push(location);
        query.push_str(&format!(" AND location ILIKE ${}", params.len()));
    }

    if let Some(q) = &filter.q {
        search_pattern = format!("%{}%", q);
        params.push(&search_pattern);
        query.push_str(&format!(
            " AND (title ILIKE ${n} OR description ILIKE ${n})",
            n = params.len()
        ));
    }

    query.push_str(" ORDER BY created_at DESC LIMIT 100");

    let rows = client.query(query.as_str(), &params).await?;
    rows.iter().map(row_to_job).collect()
}

/// Lists an employer's own postings, open and closed, newest first.
pub async fn list_for_employer(pool: &Pool, employer_id: &Uuid) -> Result<Vec<Job>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM jobs
            WHERE employer_id = $1
            ORDER BY created_at DESC
            "#,
            &[employer_id],
        )
        .await?;
    rows.iter().map(row_to_job).collect()
}

/// Closes a job posting to further applications.
pub async fn close(pool: &Pool, job_id: &Uuid) -> Result<u64> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            r#"
            UPDATE jobs
            SET is_open = false, updated_at = NOW()
            WHERE id = $1
            "#,
            &[job_id],
        )
        .await?;
    Ok(updated)
}

/// Deletes a job posting and its applications.
pub async fn delete(pool: &Pool, job_id: &Uuid) -> Result<u64> {
    let client = pool.get().await?;
    client
        .execute(
            r#"
            DELETE FROM applications
            WHERE job_id = $1
            "#,
            &[job_id],
        )
        .await?;
    let deleted = client
        .execute(
            r#"
            DELETE FROM jobs
            WHERE id = $1
            "#,
            &[job_id],
        )
        .await?;
    Ok(deleted)
}
