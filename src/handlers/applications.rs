use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        application::{Application, ApplicationStatus},
        session::Session,
    },
    services::applications as application_service,
    state::AppState,
    validation::jobs::validate_cover_letter,
};

/// The request payload for applying to a job.
#[derive(Deserialize)]
pub struct ApplyRequest {
    pub job_id: Uuid,
    #[serde(default)]
    pub cover_letter: String,
}

/// The request payload for moving an application to a new review state.
#[derive(Deserialize)]
pub struct ReviewRequest {
    pub status: ApplicationStatus,
}

fn application_json(application: Application) -> sonic_rs::Value {
    sonic_rs::json!({
        "id": application.id.to_string(),
        "job_id": application.job_id.to_string(),
        "seeker_id": application.seeker_id.to_string(),
        "cover_letter": application.cover_letter,
        "status": application.status.as_str(),
        "created_at": application.created_at.to_rfc3339()
    })
}

/// Submits the signed-in seeker's application to a job.
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<ApplyRequest>,
) -> Result<Response> {
    validate_cover_letter(&req.cover_letter)?;

    let application = application_service::apply(
        &state.db,
        session.user_id,
        req.job_id,
        req.cover_letter,
    )
    .await?;

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "id": application.id.to_string(),
        "job_id": application.job_id.to_string(),
        "status": application.status.as_str(),
        "message": "Application submitted successfully"
    }))
    .unwrap();

    Ok((StatusCode::CREATED, response).into_response())
}

/// Lists the signed-in seeker's applications.
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response> {
    let applications =
        application_service::applications_for_seeker(&state.db, session.user_id).await?;

    let applications_json: Vec<_> = applications.into_iter().map(application_json).collect();

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "count": applications_json.len(),
        "applications": applications_json
    }))
    .unwrap();

    Ok((StatusCode::OK, response).into_response())
}

/// Lists the applications to a posting the signed-in employer owns.
#[axum::debug_handler]
pub async fn job_applications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<Uuid>,
) -> Result<Response> {
    let applications =
        application_service::applications_for_job(&state.db, session.user_id, job_id).await?;

    let applications_json: Vec<_> = applications.into_iter().map(application_json).collect();

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "count": applications_json.len(),
        "applications": applications_json
    }))
    .unwrap();

    Ok((StatusCode::OK, response).into_response())
}

/// Moves an application to a new review state.
#[axum::debug_handler]
pub async fn review_application(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Response> {
    let application =
        application_service::review(&state.db, session.user_id, application_id, req.status)
            .await?;

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "id": application.id.to_string(),
        "status": application.status.as_str(),
        "message": "Application updated"
    }))
    .unwrap();

    Ok((StatusCode::OK, response).into_response())
}
