//! Comment moderation queue.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::Result;
use crate::model::{BlogComment, CommentStatus};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::AppState;
use crate::service::{BulkOutcome, BulkRequest, CommentBulkAction, CommentService};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CommentFilter {
    status: Option<CommentStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Moderation {
    status: CommentStatus,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<CommentFilter>,
) -> Result<Json<Vec<BlogComment>>> {
    let blogs = state.blogs();
    Ok(Json(
        CommentService::new(&state.storage, &blogs).list(filter.status)?,
    ))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Moderation>,
) -> Result<Json<BlogComment>> {
    let blogs = state.blogs();
    Ok(Json(
        CommentService::new(&state.storage, &blogs).set_status(&id, body.status)?,
    ))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let blogs = state.blogs();
    CommentService::new(&state.storage, &blogs).delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn bulk(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BulkRequest<CommentBulkAction>>,
) -> Result<Json<BulkOutcome>> {
    let blogs = state.blogs();
    Ok(Json(
        CommentService::new(&state.storage, &blogs).bulk(request.action, &request.ids)?,
    ))
}
