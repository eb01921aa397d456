//! HTTP error responses.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use minuta_core::{AssemblyError, MinutaError};

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request cannot produce a draft.
    #[error("{0}")]
    InvalidInput(#[from] AssemblyError),

    /// The multipart body could not be read.
    #[error("failed to read upload: {message}")]
    Upload { status: StatusCode, message: String },

    /// Extraction, resolution or rendering failed.
    #[error("failed to generate draft: {0}")]
    Generation(MinutaError),

    /// The worker running the generation died.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload { status, .. } => *status,
            ApiError::Generation(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(AssemblyError::NoDocuments) => "NO_DOCUMENTS",
            ApiError::InvalidInput(AssemblyError::EmptyTemplate) => "EMPTY_TEMPLATE",
            ApiError::Upload { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "PAYLOAD_TOO_LARGE"
            }
            ApiError::Upload { .. } => "INVALID_UPLOAD",
            ApiError::Generation(_) => "GENERATION_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<MinutaError> for ApiError {
    fn from(e: MinutaError) -> Self {
        match e {
            MinutaError::Assembly(e) => ApiError::InvalidInput(e),
            other => ApiError::Generation(other),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Upload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minuta_core::error::RenderError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(AssemblyError::NoDocuments).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MinutaError::Assembly(AssemblyError::EmptyTemplate)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(MinutaError::Render(RenderError::Write("disk".into()))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Upload {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "too big".into()
            }
            .code(),
            "PAYLOAD_TOO_LARGE"
        );
    }
}
