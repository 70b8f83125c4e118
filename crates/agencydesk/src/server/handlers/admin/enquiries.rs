//! Lead inbox for contact form enquiries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::Result;
use crate::model::{Enquiry, EnquiryPatch};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::AppState;
use crate::service::{BulkOutcome, BulkRequest, EnquiryBulkAction, EnquiryQuery};

pub(crate) async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EnquiryQuery>,
) -> Result<Json<Vec<Enquiry>>> {
    Ok(Json(state.enquiries().list(&query)?))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Enquiry>> {
    Ok(Json(state.enquiries().get(&id)?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<EnquiryPatch>,
) -> Result<Json<Enquiry>> {
    Ok(Json(state.enquiries().update(&id, patch)?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.enquiries().delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn bulk(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BulkRequest<EnquiryBulkAction>>,
) -> Result<Json<BulkOutcome>> {
    Ok(Json(state.enquiries().bulk(
        request.action,
        &request.ids,
        request.status,
    )?))
}
