//! HTTP error responses.
//!
//! Every failure is rendered as the same JSON body:
//!
//! ```json
//! { "name": "validation_error", "message": "missing or invalid data", "details": ["..."] }
//! ```
//!
//! Internal errors never reveal which pipeline stage failed; the detail is
//! the error's display string.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for request handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors returned by the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed or failed validation.
    #[error("missing or invalid data: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Extraction or storage failed.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Validation failure with a single detail.
    #[must_use]
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(vec![detail.into()])
    }

    /// Status code the error is sent with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::Validation(details) => ErrorResponse {
                name: "validation_error".to_string(),
                message: "missing or invalid data".to_string(),
                details: details.clone(),
            },
            Self::NotFound(detail) => ErrorResponse {
                name: "not_found".to_string(),
                message: "resource not found".to_string(),
                details: vec![detail.clone()],
            },
            Self::Internal(detail) => ErrorResponse {
                name: "internal_error".to_string(),
                message: "internal server error".to_string(),
                details: vec![detail.clone()],
            },
        }
    }
}

impl From<freqtable::Error> for ApiError {
    fn from(error: freqtable::Error) -> Self {
        match error {
            freqtable::Error::TableNotFound(id) => {
                Self::NotFound(format!("frequency table {id} not found"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(detail) => tracing::error!(detail = %detail, "Request failed"),
            Self::Validation(_) | Self::NotFound(_) => {
                tracing::debug!(error = %self, "Request rejected");
            }
        }
        (self.status(), Json(self.body())).into_response()
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable category.
    pub name: String,
    /// Human-readable summary of the category.
    pub message: String,
    /// What exactly went wrong.
    pub details: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use freqtable::RetrievalError;

    #[test]
    fn validation_errors_are_bad_requests() {
        let error = ApiError::validation("invalid request");

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        let body = error.body();
        assert_eq!(body.name, "validation_error");
        assert_eq!(body.message, "missing or invalid data");
        assert_eq!(body.details, vec!["invalid request"]);
    }

    #[test]
    fn missing_table_maps_to_not_found() {
        let error = ApiError::from(freqtable::Error::TableNotFound(7));

        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert_eq!(error.body().details, vec!["frequency table 7 not found"]);
    }

    #[test]
    fn extraction_failures_hide_the_stage() {
        let error = ApiError::from(freqtable::Error::Retrieval {
            url: "http://github.com/eroatta/freqtable".to_string(),
            source: RetrievalError::RepositoryNotFound("unreachable".to_string()),
        });

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = error.body();
        assert_eq!(body.name, "internal_error");
        assert_eq!(body.message, "internal server error");
        assert_eq!(
            body.details,
            vec!["error cloning repository http://github.com/eroatta/freqtable"]
        );
    }
}
