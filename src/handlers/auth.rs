use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use crate::{
    error::Result,
    models::{
        session::Session,
        user::{Role, UserProfile},
    },
    repositories::session::SessionStore,
    repositories::user::ProfileChanges,
    services::auth as auth_service,
    state::AppState,
    validation::auth::*,
};

/// The request payload for user registration.
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// The request payload for user login.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The request payload for updating the signed-in user's profile.
#[derive(Deserialize, Debug)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: Option<i32>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt for: {}", payload.email);
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_name(&payload.first_name, "First name")?;
    validate_name(&payload.last_name, "Last name")?;

    let user = auth_service::register_user(
        &state.db,
        payload.first_name,
        payload.last_name,
        payload.email,
        payload.password,
        payload.role,
    )
    .await?;

    tracing::info!("✅ User registered: {}", user.id);

    let session = Session {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
        login_time: Utc::now(),
    };
    let profile = UserProfile::from(&user);

    let store = SessionStore::new(cookies, state.config.session_max_age_hours);
    store.persist(&session, &profile)?;

    tracing::info!("✅ Session and profile records persisted");

    let response = AuthResponse {
        success: true,
        message: "Registration successful. Welcome to SkillConnect!".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt for: {}", payload.email);
    validate_email(&payload.email)?;

    let user = auth_service::authenticate_user(&state.db, payload.email, payload.password).await?;

    let session = Session {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
        login_time: Utc::now(),
    };
    let profile = UserProfile::from(&user);

    let store = SessionStore::new(cookies, state.config.session_max_age_hours);
    store.persist(&session, &profile)?;

    tracing::info!("✅ User logged in: {}", user.id);

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles user logout.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
) -> Result<Response> {
    tracing::info!("👋 Logout for user: {}", session.user_id);

    let store = SessionStore::new(cookies, state.config.session_max_age_hours);
    store.clear();

    tracing::info!("✅ User logged out: {}", session.user_id);

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the signed-in user's profile record.
#[axum::debug_handler]
pub async fn me(Extension(profile): Extension<UserProfile>) -> Result<Response> {
    Ok((StatusCode::OK, Json(profile)).into_response())
}

/// Updates the signed-in user's profile and refreshes the persisted record.
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Response> {
    tracing::info!("📝 Profile update for user: {}", session.user_id);
    validate_name(&payload.first_name, "First name")?;
    validate_name(&payload.last_name, "Last name")?;

    let changes = ProfileChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        skills: payload.skills,
        experience_years: payload.experience_years,
        company_name: payload.company_name,
        company_size: payload.company_size,
        industry: payload.industry,
    };

    let user = auth_service::update_profile(&state.db, session.user_id, changes).await?;
    let profile = UserProfile::from(&user);

    let store = SessionStore::new(cookies, state.config.session_max_age_hours);
    store.persist(&session, &profile)?;

    tracing::info!("✅ Profile updated for user: {}", session.user_id);

    Ok((StatusCode::OK, Json(profile)).into_response())
}
