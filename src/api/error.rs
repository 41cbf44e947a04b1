//! HTTP mapping for [`HaasError`].

use crate::utils::error::{ErrorKind, HaasError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub type ApiResult<T> = std::result::Result<T, HaasError>;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidQuantity | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InsufficientCapacity | ErrorKind::OverCheckin | ErrorKind::Conflict => {
            StatusCode::CONFLICT
        }
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body rejections from axum's `Json` extractor (bad syntax, wrong content
/// type, mistyped fields) surface as `invalid_request`.
pub fn invalid_body(rejection: JsonRejection) -> HaasError {
    HaasError::InvalidRequest {
        field: "body".to_string(),
        reason: rejection.body_text(),
    }
}

impl IntoResponse for HaasError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        let error = if self.is_client_error() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            error,
            code: kind.as_str().to_string(),
        };

        (status, Json(body)).into_response()
    }
}
