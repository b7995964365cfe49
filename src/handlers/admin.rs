use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::session::Session,
    repositories::user as user_repo,
    services::jobs as job_service,
    state::AppState,
};

/// Lists all accounts for moderation.
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<Response> {
    let users = user_repo::list(&state.db).await?;

    let users_json: Vec<_> = users
        .into_iter()
        .map(|u| {
            sonic_rs::json!({
                "id": u.id.to_string(),
                "first_name": u.first_name,
                "last_name": u.last_name,
                "email": u.email,
                "role": u.role.as_str(),
                "is_active": u.is_active,
                "created_at": u.created_at.to_rfc3339()
            })
        })
        .collect();

    let response = sonic_rs::to_string(&sonic_rs::json!({
        "count": users_json.len(),
        "users": users_json
    }))
    .unwrap();

    Ok((StatusCode::OK, response).into_response())
}

/// Deactivates an account. Deactivated accounts cannot sign in again.
#[axum::debug_handler]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<Uuid>,
) -> Result<Response> {
    if user_id == session.user_id {
        return Err(AppError::Validation(
            "Cannot deactivate your own account".to_string(),
        ));
    }

    let updated = user_repo::set_active(&state.db, &user_id, false).await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!("✅ User deactivated by admin {}: {}", session.user_id, user_id);

    Ok((StatusCode::OK, r#"{"message":"User deactivated"}"#).into_response())
}

/// Removes a job posting and its applications. Moderation path.
#[axum::debug_handler]
pub async fn remove_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<Uuid>,
) -> Result<Response> {
    job_service::remove_job(&state.db, job_id).await?;

    tracing::info!("✅ Job removed by admin {}: {}", session.user_id, job_id);

    Ok((StatusCode::OK, r#"{"message":"Job removed"}"#).into_response())
}
