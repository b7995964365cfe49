use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{error::AppError, security};

/// The cookie carrying the CSRF token the browser resends automatically.
pub const CSRF_COOKIE: &str = "csrf-token";

/// The header the client reads from safe responses and echoes on writes.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Builds the CSRF cookie. HttpOnly so scripts cannot read it, Strict so
/// cross-site requests never carry it.
fn csrf_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(CSRF_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie
}

/// A middleware implementing the double-submit-cookie CSRF check.
///
/// Safe requests (GET/HEAD/OPTIONS) run the handler and leave with a fresh
/// token in both the `x-csrf-token` response header and the `csrf-token`
/// cookie. Unsafe requests must echo the header token matching the cookie
/// exactly, or they are rejected before the handler runs.
///
/// # Arguments
///
/// * `cookies` - The request cookies.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The wrapped handler's response, or a 403 rejection.
pub async fn csrf_guard(cookies: Cookies, req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::GET
        || req.method() == Method::HEAD
        || req.method() == Method::OPTIONS
    {
        let mut response = next.run(req).await;

        let token = match security::csrf::generate_csrf_token() {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("❌ CSRF token generation failed: {}", e);
                return AppError::Internal("CSRF token generation failed".to_string())
                    .into_response();
            }
        };

        cookies.add(csrf_cookie(token.clone()));
        if let Ok(value) = HeaderValue::from_str(&token) {
            response.headers_mut().insert(CSRF_HEADER, value);
        }

        return response;
    }

    let cookie_token = match cookies.get(CSRF_COOKIE) {
        Some(c) => c.value().to_string(),
        None => {
            tracing::warn!("❌ CSRF: token cookie missing");
            return AppError::CsrfRejected.into_response();
        }
    };

    let header_token = match req.headers().get(CSRF_HEADER) {
        Some(token) => match token.to_str() {
            Ok(t) => t.to_string(),
            Err(_) => {
                tracing::warn!("❌ CSRF: token header is not valid UTF-8");
                return AppError::CsrfRejected.into_response();
            }
        },
        None => {
            tracing::warn!("❌ CSRF: token header missing");
            return AppError::CsrfRejected.into_response();
        }
    };

    if !bool::from(header_token.as_bytes().ct_eq(cookie_token.as_bytes())) {
        tracing::warn!("❌ CSRF: token mismatch");
        return AppError::CsrfRejected.into_response();
    }

    tracing::debug!("✅ CSRF token valid");
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::to_bytes,
        middleware::from_fn,
        routing::get,
    };
    use http::{StatusCode, header};
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    fn app() -> Router {
        Router::new()
            .route("/resource", get(|| async { "ok" }).post(|| async { "written" }))
            .layer(from_fn(csrf_guard))
            .layer(CookieManagerLayer::new())
    }

    async fn mint_token() -> String {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .uri("/resource")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(CSRF_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn safe_request_mints_matching_header_and_cookie() {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .uri("/resource")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let token = response
            .headers()
            .get(CSRF_HEADER)
            .expect("token header on safe response")
            .to_str()
            .unwrap()
            .to_string();

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("token cookie on safe response")
            .to_str()
            .unwrap();

        assert!(set_cookie.contains(&format!("csrf-token={}", token)));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("SameSite=Strict"));
        assert!(set_cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn write_with_echoed_token_pair_is_admitted() {
        let token = mint_token().await;

        let response = app()
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/resource")
                    .header(CSRF_HEADER, &token)
                    .header(header::COOKIE, format!("csrf-token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn write_with_mismatched_header_is_rejected() {
        let token = mint_token().await;

        let response = app()
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/resource")
                    .header(CSRF_HEADER, "not-the-token")
                    .header(header::COOKIE, format!("csrf-token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "CSRF token validation failed");
    }

    #[tokio::test]
    async fn write_with_no_token_at_all_is_rejected() {
        let response = app()
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/resource")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
