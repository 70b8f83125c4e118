//! Request tracing and admin authentication.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::AdminUser;

use super::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// The admin behind a request, inserted by [`require_admin`].
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    /// The account, as loaded when the request arrived.
    pub user: AdminUser,
    /// The bearer token the request carried.
    pub token: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the bearer token to an active admin.
pub(crate) async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .to_string();
    let user = state.users().authenticate(&token)?;
    request
        .extensions_mut()
        .insert(AuthenticatedAdmin { user, token });
    Ok(next.run(request).await)
}

/// Owners only. Must run inside [`require_admin`].
pub(crate) async fn require_owner(request: Request, next: Next) -> Result<Response> {
    let admin = request
        .extensions()
        .get::<AuthenticatedAdmin>()
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    if !admin.user.is_active_owner() {
        return Err(Error::forbidden("owner role required"));
    }
    Ok(next.run(request).await)
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().simple().to_string(), String::from)
}

/// Wrap each request in an `http.request` span and echo its id.
pub(crate) async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |p| p.as_str().to_string());
    let request_id = request_id(request.headers());

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    span.in_scope(|| {
        info!(
            status = response.status().as_u16(),
            latency_ms,
            "Request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::app;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t0k"));
        assert_eq!(bearer_token(&headers), Some("t0k"));
    }

    #[test]
    fn test_request_id_reuses_caller_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers).len(), 32);
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[tokio::test]
    async fn test_admin_routes_need_token() {
        let app = app();
        let (status, body) = app.send(Method::GET, "/api/admin/blogs", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthorized");

        let (status, _) = app
            .send(Method::GET, "/api/admin/blogs", Some("bogus"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_response_echoes_request_id() {
        let app = app();
        let request = axum::http::Request::builder()
            .uri("/health")
            .header(REQUEST_ID_HEADER, "trace-me")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-me");
    }
}
