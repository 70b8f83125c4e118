pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod public;

use axum::http::Uri;

use crate::error::Error;

/// Fallback for unknown routes.
pub(crate) async fn not_found(uri: Uri) -> Error {
    Error::not_found("routes", uri.path())
}
