//! Routes the marketing site calls without a session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::model::{BlogPost, CommentStatus, NewComment, NewEnquiry, Page, Project, PublicComment};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::AppState;
use crate::service::{BlogQuery, CommentService, ProjectQuery};

pub(crate) async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn list_blogs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlogQuery>,
) -> Result<Json<Page<BlogPost>>> {
    Ok(Json(state.blogs().list_published(&query)?))
}

pub(crate) async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>> {
    Ok(Json(state.blogs().get_published(&slug)?))
}

pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<PublicComment>>> {
    let blogs = state.blogs();
    Ok(Json(CommentService::new(&state.storage, &blogs).list_public(&slug)?))
}

/// Acknowledgement for a comment awaiting moderation.
#[derive(Debug, Serialize)]
pub(crate) struct CommentReceipt {
    id: String,
    status: CommentStatus,
}

pub(crate) async fn submit_comment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(input): ApiJson<NewComment>,
) -> Result<(StatusCode, Json<CommentReceipt>)> {
    let blogs = state.blogs();
    let comment = CommentService::new(&state.storage, &blogs).submit(&slug, input)?;
    Ok((
        StatusCode::CREATED,
        Json(CommentReceipt {
            id: comment.id,
            status: comment.status,
        }),
    ))
}

pub(crate) async fn list_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProjectQuery>,
) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.projects().list_published(&query)?))
}

pub(crate) async fn get_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(state.projects().get_published(&slug)?))
}

/// The reply is the same whether or not the honeypot fired.
pub(crate) async fn submit_enquiry(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewEnquiry>,
) -> Result<(StatusCode, Json<Value>)> {
    state.enquiries().submit(form)?;
    Ok((StatusCode::CREATED, Json(json!({ "received": true }))))
}
