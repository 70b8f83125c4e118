//! Error to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::error::Error;

/// HTTP status for an error.
#[must_use]
pub(crate) fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        Error::Forbidden(_) => StatusCode::FORBIDDEN,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Conflict { .. } => StatusCode::CONFLICT,
        Error::ContentRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed");
            "internal server error".to_string()
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };
        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_status_map() {
        assert_eq!(
            status_for(&Error::validation("name", "empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&Error::unauthorized("no token")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&Error::forbidden("owners")), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&Error::not_found("blogs", "x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&Error::conflict("dup")), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&Error::ContentRejected {
                rule: "script_block".to_string()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&Error::internal("bug")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_error_hides_detail() {
        let response = Error::internal("disk on fire").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "internal");
        assert_eq!(body["error"]["message"], "internal server error");
    }

    #[tokio::test]
    async fn test_client_error_carries_message() {
        let response = Error::validation("email", "must be an email address").into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "validation_failed");
        assert_eq!(
            body["error"]["message"],
            "invalid email: must be an email address"
        );
    }
}
