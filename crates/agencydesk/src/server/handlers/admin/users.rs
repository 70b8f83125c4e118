//! Account management. Mounted behind the owner check.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::error::Result;
use crate::model::{AdminProfile, AdminUserPatch, NewAdminUser};
use crate::server::extract::ApiJson;
use crate::server::{AppState, AuthenticatedAdmin};

pub(crate) async fn list(State(state): State<AppState>) -> Result<Json<Vec<AdminProfile>>> {
    Ok(Json(state.users().list()?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewAdminUser>,
) -> Result<(StatusCode, Json<AdminProfile>)> {
    Ok((StatusCode::CREATED, Json(state.users().create(input)?)))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<AdminUserPatch>,
) -> Result<Json<AdminProfile>> {
    Ok(Json(state.users().update(&id, patch)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedAdmin>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.users().delete(&admin.user.id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
