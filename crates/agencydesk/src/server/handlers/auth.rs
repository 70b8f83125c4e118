//! Session routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::AdminProfile;
use crate::server::extract::ApiJson;
use crate::server::{AppState, AuthenticatedAdmin};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    token: String,
    expires_at: DateTime<Utc>,
    user: AdminProfile,
}

pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (session, user) = state.users().login(&body.email, &body.password)?;
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user,
    }))
}

pub(crate) async fn logout(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
) -> StatusCode {
    state.users().logout(&admin.token);
    StatusCode::NO_CONTENT
}

pub(crate) async fn me(Extension(admin): Extension<AuthenticatedAdmin>) -> Json<AdminProfile> {
    Json(admin.user.profile())
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::server::test_support::{app, OWNER_EMAIL};

    #[tokio::test]
    async fn test_login_me_logout() {
        let app = app();
        let token = app.login().await;

        let (status, me) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], OWNER_EMAIL);
        assert_eq!(me["role"], "owner");
        assert!(me.get("password_hash").is_none());

        let (status, _) = app
            .send(Method::POST, "/api/auth/logout", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let app = app();
        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": OWNER_EMAIL, "password": "wrong-password" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "unauthorized: invalid credentials");
    }
}
