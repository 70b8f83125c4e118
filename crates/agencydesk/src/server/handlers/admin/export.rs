//! CSV downloads of whole collections.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::error::Result;
use crate::server::AppState;
use crate::service::{export_csv, ExportCollection};

/// Stream one collection as a CSV attachment.
pub(crate) async fn download(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Response> {
    let collection: ExportCollection = collection.parse()?;
    let body = export_csv(&state.storage, collection)?;

    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", collection.file_name()))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}
