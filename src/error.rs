use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to HTTP clients
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid file type. Only PDF, PNG, JPG, and JPEG files are allowed.")]
    InvalidFileType(String),

    #[error("File too large (max: {max} bytes)")]
    FileTooLarge { max: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures inside a single pipeline stage. These never reach the client;
/// each stage logs them and degrades to an empty result.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to initialize {component}: {reason}")]
    Initialization {
        component: &'static str,
        reason: String,
    },

    #[error("Detection request failed: {0}")]
    Detection(String),

    #[error("Malformed detection response: {0}")]
    MalformedPrediction(String),

    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Failed to rasterize PDF: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingFile
            | ApiError::EmptyFilename
            | ApiError::InvalidFileType(_)
            | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Detail stays in the logs; clients only see the fixed message
        let message = match &self {
            ApiError::InvalidRequest(detail) => {
                tracing::error!("Rejected malformed request: {}", detail);
                "Invalid request".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!("Error in extract_text endpoint: {}", detail);
                "Internal server error".to_string()
            }
            ApiError::InvalidFileType(ext) => {
                tracing::error!("Invalid file type: {:?}", ext);
                self.to_string()
            }
            _ => {
                tracing::error!("{}", self);
                self.to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_client_errors_map_to_bad_request() {
        for (err, message) in [
            (ApiError::MissingFile, "No file uploaded"),
            (ApiError::EmptyFilename, "No selected file"),
            (
                ApiError::InvalidFileType(".exe".to_string()),
                "Invalid file type. Only PDF, PNG, JPG, and JPEG files are allowed.",
            ),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"], message);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::Internal("disk full at /srv/uploads".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let response = ApiError::FileTooLarge { max: 1024 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"], "File too large (max: 1024 bytes)");
    }

    #[tokio::test]
    async fn test_invalid_request_hides_parser_detail() {
        let response = ApiError::InvalidRequest("boundary mismatch".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid request");
    }
}
