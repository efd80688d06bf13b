use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::domain::errors::DomainError;
use crate::server::dto::ErrorBody;

pub const PROCESSING_FAILED: &str = "Failed to process video";

/// HTTP face of a `DomainError`
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DomainError::MissingFile => (StatusCode::BAD_REQUEST, "No video file provided"),
            DomainError::UnsupportedType(_) => (StatusCode::BAD_REQUEST, "Unsupported file type"),
            DomainError::TooLarge { .. } => (StatusCode::BAD_REQUEST, "File is too large"),
            DomainError::InvalidRange(_) => (StatusCode::BAD_REQUEST, "Invalid trim range"),
            DomainError::EncoderFailure(_) | DomainError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            DomainError::EncoderFailure(err) => {
                error!(
                    diagnostics = %err.diagnostic_output,
                    "Encoder failure: {}",
                    err.message
                );
            }
            DomainError::Internal(msg) => error!("Internal error: {}", msg),
            _ => {}
        }

        let (status, message) = self.status_and_message();
        let body = Json(ErrorBody {
            error: message.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TranscodeError;

    #[test]
    fn test_validation_errors_are_bad_requests() {
        for err in [
            DomainError::MissingFile,
            DomainError::UnsupportedType("image/png".to_string()),
            DomainError::TooLarge { size: 2, limit: 1 },
            DomainError::InvalidRange("empty".to_string()),
        ] {
            assert_eq!(ApiError(err).status_and_message().0, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_encoder_failure_hides_diagnostics() {
        let err = ApiError(DomainError::EncoderFailure(TranscodeError::new(
            "encoder exited with status 1",
            "Invalid data found when processing input",
        )));
        assert_eq!(
            err.status_and_message(),
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process video")
        );
    }
}
