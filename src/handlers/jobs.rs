use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{job::Job, session::Session},
    repositories::job::JobFilter,
    services::jobs as job_service,
    state::AppState,
    validation::jobs::validate_job,
};

/// The request payload for posting a job.
#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
}

/// The query parameters for the public job listing.
#[derive(Deserialize, Default)]
pub struct ListJobsQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub q: Option<String>,
}

fn job_json(job: Job) -> sonic_rs::Value {
    sonic_rs::json!({
        "id": job.id.to_string(),
        "employer_id": job.employer_id.to_string(),
        "title": job.title,
        "description": job.description,
        "location": job.location,
        "category": job.category,
        "salary_min": job.salary_min,
        "salary_max": job.salary_max,
        "is_open": job.is_open,
        "created_at": job.created_at.to_rfc3339()
    })
}

/// Lists open job postings. Public.
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Response> {
    let filter = JobFilter {
        category: query.category,
        location: query.location,
        q: query.q,
    };

    let jobs = job_service::list_open_jobs(&state.db, &filter).await?;

    let jobs_json: Vec<_> = jobs.into_iter().map(job_json).collect();

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "count": jobs_json.len(),
        "jobs": jobs_json
    }))
    .unwrap();

    Ok((StatusCode::OK, response).into_response())
}

/// Fetches a single job posting. Public.
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Response> {
    let job = job_service::get_job(&state.db, job_id).await?;

    let response = sonic_rs::to_string(&job_json(job)).unwrap();

    Ok((StatusCode::OK, response).into_response())
}

/// Lists the signed-in employer's own postings, open and closed.
#[axum::debug_handler]
pub async fn my_jobs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response> {
    let jobs = job_service::list_employer_jobs(&state.db, session.user_id).await?;

    let jobs_json: Vec<_> = jobs.into_iter().map(job_json).collect();

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "count": jobs_json.len(),
        "jobs": jobs_json
    }))
    .unwrap();

    Ok((StatusCode::OK, response).into_response())
}

/// Creates a job posting owned by the signed-in employer.
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Response> {
    validate_job(
        &req.title,
        &req.description,
        &req.location,
        &req.category,
        req.salary_min,
        req.salary_max,
    )?;

    let job = job_service::create_job(
        &state.db,
        session.user_id,
        job_service::NewJob {
            title: req.title,
            description: req.description,
            location: req.location,
            category: req.category,
            salary_min: req.salary_min,
            salary_max: req.salary_max,
        },
    )
    .await?;

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "id": job.id.to_string(),
        "title": job.title,
        "created_at": job.created_at.to_rfc3339(),
        "message": "Job posted successfully"
    }))
    .unwrap();

    Ok((StatusCode::CREATED, response).into_response())
}

/// Closes the signed-in employer's posting to further applications.
#[axum::debug_handler]
pub async fn close_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<Uuid>,
) -> Result<Response> {
    job_service::close_job(&state.db, session.user_id, job_id).await?;
    Ok((StatusCode::OK, r#"{"message":"Job closed successfully"}"#).into_response())
}

/// Deletes the signed-in employer's posting.
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<Uuid>,
) -> Result<Response> {
    job_service::delete_job(&state.db, session.user_id, job_id).await?;
    Ok((StatusCode::OK, r#"{"message":"Job deleted successfully"}"#).into_response())
}
