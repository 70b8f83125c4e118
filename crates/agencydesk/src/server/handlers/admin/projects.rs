//! Portfolio project editing for the admin console.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::Result;
use crate::model::{Project, ProjectInput};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::AppState;
use crate::service::{BulkOutcome, BulkRequest, ContentBulkAction, ProjectQuery};

pub(crate) async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProjectQuery>,
) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.projects().list_all(&query)?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> Result<(StatusCode, Json<Project>)> {
    Ok((StatusCode::CREATED, Json(state.projects().create(input)?)))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(state.projects().get(&id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ProjectInput>,
) -> Result<Json<Project>> {
    Ok(Json(state.projects().update(&id, input)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.projects().delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn bulk(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BulkRequest<ContentBulkAction>>,
) -> Result<Json<BulkOutcome>> {
    Ok(Json(state.projects().bulk(request.action, &request.ids)?))
}
