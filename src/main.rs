use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};

use http::{Method, header};
use std::net::SocketAddr;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;
mod security {
    pub mod csrf;
}

mod models {
    pub mod application;
    pub mod job;
    pub mod session;
    pub mod user;
}

mod repositories {
    pub mod application;
    pub mod job;
    pub mod session;
    pub mod user;
}

mod services {
    pub mod applications;
    pub mod auth;
    pub mod jobs;
}

mod handlers {
    pub mod admin;
    pub mod applications;
    pub mod auth;
    pub mod jobs;
}

mod middleware_layer {
    pub mod auth;
    pub mod csrf;
    pub mod rate_limit;
}

mod validation {
    pub mod auth;
    pub mod jobs;
}

use config::Config;
use state::AppState;

/// Assembles the application router.
///
/// Every protected write route sits behind the admission pipeline in this
/// order: rate limiter, then CSRF guard, then the session/role guard, then
/// the handler. The rate limiter stays outermost so that even CSRF-rejected
/// requests consume budget; reversing the order would let an attacker probe
/// token validity for free.
fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
            "x-csrf-token".parse().unwrap(),
        ])
        .allow_credentials(true)
        .expose_headers(["x-csrf-token".parse().unwrap()])
        .max_age(Duration::from_secs(86400));

    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::limit_requests,
        ))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/api/jobs", get(handlers::jobs::list_jobs))
        .route("/api/jobs/{job_id}", get(handlers::jobs::get_job))
        .route_layer(from_fn(middleware_layer::csrf::csrf_guard))
        .with_state(state.clone());

    let account_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/profile", put(handlers::auth::update_profile))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .route_layer(from_fn(middleware_layer::csrf::csrf_guard))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::limit_requests,
        ))
        .with_state(state.clone());

    let seeker_routes = Router::new()
        .route(
            "/api/applications",
            post(handlers::applications::apply).get(handlers::applications::my_applications),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_seeker,
        ))
        .route_layer(from_fn(middleware_layer::csrf::csrf_guard))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::limit_requests,
        ))
        .with_state(state.clone());

    let employer_routes = Router::new()
        .route(
            "/api/employer/jobs",
            get(handlers::jobs::my_jobs).post(handlers::jobs::create_job),
        )
        .route(
            "/api/employer/jobs/{job_id}",
            delete(handlers::jobs::delete_job),
        )
        .route(
            "/api/employer/jobs/{job_id}/close",
            post(handlers::jobs::close_job),
        )
        .route(
            "/api/employer/jobs/{job_id}/applications",
            get(handlers::applications::job_applications),
        )
        .route(
            "/api/employer/applications/{application_id}/status",
            post(handlers::applications::review_application),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_employer,
        ))
        .route_layer(from_fn(middleware_layer::csrf::csrf_guard))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::limit_requests,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route(
            "/api/admin/users/{user_id}/deactivate",
            post(handlers::admin::deactivate_user),
        )
        .route(
            "/api/admin/jobs/{job_id}",
            delete(handlers::admin::remove_job),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_admin,
        ))
        .route_layer(from_fn(middleware_layer::csrf::csrf_guard))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::limit_requests,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(auth_routes)
        .merge(public_routes)
        .merge(account_routes)
        .merge(seeker_routes)
        .merge(employer_routes)
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .fallback_service(ServeDir::new("public"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let app = build_router(state.clone());

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .context("Invalid BIND_ADDR")?;
    tracing::info!("🚀 SkillConnect listening on http://{}", addr);
    tracing::info!("✅ All systems operational");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::models::{session::Session, user::UserProfile};
    use crate::repositories::session::encode_record;
    use axum::body::Body;
    use chrono::Utc;
    use http::StatusCode;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn seeker_records() -> (String, String) {
        let user_id = Uuid::new_v4();
        let session = Session {
            user_id,
            email: "juma@example.co.ke".to_string(),
            role: Role::Seeker,
            login_time: Utc::now(),
        };
        let profile = UserProfile {
            id: user_id,
            first_name: "Juma".to_string(),
            last_name: "Otieno".to_string(),
            email: "juma@example.co.ke".to_string(),
            role: Role::Seeker,
            skills: vec![],
            experience_years: None,
            company_name: None,
            company_size: None,
            industry: None,
        };
        (
            encode_record(&session).unwrap(),
            encode_record(&profile).unwrap(),
        )
    }

    // The rate limiter must sit outside the CSRF guard: tokenless writes are
    // CSRF-rejected, but each one still consumes budget, so the 11th turns
    // into a 429 instead of another 403.
    #[tokio::test]
    async fn csrf_rejected_writes_still_consume_rate_budget() {
        let app = build_router(AppState::for_tests());

        for i in 1..=10 {
            let response = app
                .clone()
                .oneshot(
                    http::Request::builder()
                        .method("POST")
                        .uri("/api/applications")
                        .header("x-forwarded-for", "203.0.113.9")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from("{}"))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::FORBIDDEN,
                "request {} should be CSRF-rejected",
                i
            );
        }

        let response = app
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/api/applications")
                    .header("x-forwarded-for", "203.0.113.9")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Too many requests. Please try again later.");
    }

    #[tokio::test]
    async fn rate_budgets_are_isolated_per_client() {
        let app = build_router(AppState::for_tests());

        for _ in 0..10 {
            app.clone()
                .oneshot(
                    http::Request::builder()
                        .method("POST")
                        .uri("/api/applications")
                        .header("x-forwarded-for", "198.51.100.1")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from("{}"))
                        .unwrap(),
                )
                .await
                .unwrap();
        }

        // A different client still has its full budget.
        let response = app
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/api/applications")
                    .header("x-forwarded-for", "198.51.100.2")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn seeker_is_redirected_off_employer_routes() {
        let app = build_router(AppState::for_tests());
        let (session, profile) = seeker_records();

        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/api/employer/jobs")
                    .header("x-forwarded-for", "203.0.113.20")
                    .header(
                        header::COOKIE,
                        format!("sc_session={}; sc_profile={}", session, profile),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/dashboard/seeker"
        );
    }

    #[tokio::test]
    async fn anonymous_write_to_guarded_route_is_csrf_rejected_first() {
        let app = build_router(AppState::for_tests());

        let response = app
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .header("x-forwarded-for", "203.0.113.30")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // No token pair at all: the CSRF guard ends the request before the
        // session guard ever runs.
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "CSRF token validation failed");
    }
}
