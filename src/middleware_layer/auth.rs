use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::{
        session::Session,
        user::{Role, UserProfile},
    },
    repositories::session::SessionStore,
    state::AppState,
};

/// The resolved outcome of a guard check.
///
/// There is no "allow" fallthrough: anything that is not explicitly
/// `Authorized` ends the request at the guard.
#[derive(Debug)]
pub enum AuthCheck {
    /// Session fresh, profile paired, role acceptable.
    Authorized {
        session: Session,
        profile: UserProfile,
    },
    /// Authenticated, but the profile's role differs from the required one.
    /// Resolved with a redirect to the actual role's own dashboard.
    WrongRole { actual: Role },
    /// No usable session: missing, expired, malformed, or mispaired records.
    Unauthenticated,
}

/// Resolves the guard state from the two client-persisted records.
///
/// Expiry and malformed-record purging have already happened inside
/// [`SessionStore`]; this decides presence, pairing, and role match.
pub fn evaluate(
    session: Option<Session>,
    profile: Option<UserProfile>,
    required_role: Option<Role>,
) -> AuthCheck {
    let (session, profile) = match (session, profile) {
        (Some(session), Some(profile)) => (session, profile),
        _ => return AuthCheck::Unauthenticated,
    };

    // The profile is the durable record, the session the proof of login;
    // they must describe the same account.
    if profile.id != session.user_id {
        tracing::warn!(
            "❌ Session/profile pairing mismatch: {} vs {}",
            session.user_id,
            profile.id
        );
        return AuthCheck::Unauthenticated;
    }

    match required_role {
        Some(required) if profile.role != required => {
            AuthCheck::WrongRole {
                actual: profile.role,
            }
        }
        _ => AuthCheck::Authorized { session, profile },
    }
}

/// Runs the guard for one request.
///
/// The redirect decision is made exactly once, before the handler is ever
/// polled, so protected content cannot leak while a role mismatch resolves.
async fn guard(
    state: AppState,
    cookies: Cookies,
    required_role: Option<Role>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let store = SessionStore::new(cookies, state.config.session_max_age_hours);

    match evaluate(store.session(), store.profile(), required_role) {
        AuthCheck::Authorized { session, profile } => {
            tracing::debug!("✅ User authenticated: {}", session.user_id);
            req.extensions_mut().insert(session);
            req.extensions_mut().insert(profile);
            next.run(req).await
        }
        AuthCheck::WrongRole { actual } => {
            tracing::debug!(
                "Role mismatch, redirecting to {}",
                actual.dashboard_path()
            );
            Redirect::to(actual.dashboard_path()).into_response()
        }
        AuthCheck::Unauthenticated => {
            store.clear();
            AppError::SignInRequired.into_response()
        }
    }
}

/// A middleware that requires a valid session, any role.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    guard(state, cookies, None, req, next).await
}

/// A middleware that requires a valid seeker session.
pub async fn require_seeker(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    guard(state, cookies, Some(Role::Seeker), req, next).await
}

/// A middleware that requires a valid employer session.
pub async fn require_employer(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    guard(state, cookies, Some(Role::Employer), req, next).await
}

/// A middleware that requires a valid admin session.
pub async fn require_admin(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    guard(state, cookies, Some(Role::Admin), req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::session::encode_record;
    use axum::{Extension, Router, body::to_bytes, middleware::from_fn_with_state, routing::get};
    use chrono::{Duration, Utc};
    use http::{StatusCode, header};
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;
    use uuid::Uuid;

    fn app(state: AppState) -> Router {
        let employer_area = Router::new()
            .route("/employer-area", get(|| async { "employer content" }))
            .route_layer(from_fn_with_state(state.clone(), require_employer));

        let any_area = Router::new()
            .route(
                "/me",
                get(|Extension(profile): Extension<UserProfile>| async move { profile.email }),
            )
            .route_layer(from_fn_with_state(state.clone(), require_auth));

        Router::new()
            .merge(employer_area)
            .merge(any_area)
            .layer(CookieManagerLayer::new())
    }

    fn record_pair(role: Role, login_hours_ago: i64) -> (String, String) {
        let user_id = Uuid::new_v4();
        let session = Session {
            user_id,
            email: "wanjiku@example.co.ke".to_string(),
            role,
            login_time: Utc::now() - Duration::hours(login_hours_ago),
        };
        let profile = UserProfile {
            id: user_id,
            first_name: "Wanjiku".to_string(),
            last_name: "Kamau".to_string(),
            email: "wanjiku@example.co.ke".to_string(),
            role,
            skills: vec!["plumbing".to_string()],
            experience_years: Some(4),
            company_name: None,
            company_size: None,
            industry: None,
        };
        (
            encode_record(&session).unwrap(),
            encode_record(&profile).unwrap(),
        )
    }

    fn request_with_records(uri: &str, session: &str, profile: &str) -> http::Request<Body> {
        http::Request::builder()
            .uri(uri)
            .header(
                header::COOKIE,
                format!("sc_session={}; sc_profile={}", session, profile),
            )
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn valid_session_renders_protected_content() {
        let (session, profile) = record_pair(Role::Seeker, 1);
        let response = app(AppState::for_tests())
            .oneshot(request_with_records("/me", &session, &profile))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"wanjiku@example.co.ke");
    }

    #[tokio::test]
    async fn missing_records_prompt_sign_in() {
        let response = app(AppState::for_tests())
            .oneshot(
                http::Request::builder()
                    .uri("/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Sign in required");
        assert_eq!(json["login"], "/login");
        assert_eq!(json["signup"], "/signup");
    }

    #[tokio::test]
    async fn expired_session_is_purged_and_prompts_sign_in() {
        let (session, profile) = record_pair(Role::Seeker, 25);
        let response = app(AppState::for_tests())
            .oneshot(request_with_records("/me", &session, &profile))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let removals: Vec<&str> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert!(
            removals
                .iter()
                .any(|c| c.starts_with("sc_session=") && c.contains("Max-Age=0")),
            "session record should be purged, got: {:?}",
            removals
        );
        assert!(
            removals
                .iter()
                .any(|c| c.starts_with("sc_profile=") && c.contains("Max-Age=0")),
            "profile record should be purged, got: {:?}",
            removals
        );
    }

    #[tokio::test]
    async fn wrong_role_redirects_to_actual_dashboard() {
        let (session, profile) = record_pair(Role::Seeker, 1);
        let response = app(AppState::for_tests())
            .oneshot(request_with_records("/employer-area", &session, &profile))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/dashboard/seeker"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!body.windows(16).any(|w| w == b"employer content"));
    }

    #[tokio::test]
    async fn corrupt_session_record_fails_closed() {
        let (session, profile) = record_pair(Role::Seeker, 1);
        let truncated = &session[..session.len() / 2];
        let response = app(AppState::for_tests())
            .oneshot(request_with_records("/me", truncated, &profile))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn mispaired_records_fail_closed() {
        let (session, _) = record_pair(Role::Seeker, 1);
        let (_, other_profile) = record_pair(Role::Seeker, 1);
        let response = app(AppState::for_tests())
            .oneshot(request_with_records("/me", &session, &other_profile))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
