use crate::extraction::ExtractionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Everything that can end a `/process-meeting` request unsuccessfully
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("empty input")]
    EmptyInput,

    #[error("invalid file type: {0}")]
    InvalidFileType(String),

    /// The body could not be read as multipart or JSON
    #[error("malformed request body: {message}")]
    MalformedBody { status: StatusCode, message: String },

    #[error("request timed out")]
    RequestTimeout,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl ApiError {
    /// Status code and `{error, message}` body for this failure
    pub fn parts(&self) -> (StatusCode, ErrorResponse) {
        let (status, error, message) = match self {
            ApiError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                "Empty input",
                "The provided file is empty".to_string(),
            ),
            ApiError::InvalidFileType(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid file type",
                "The provided file must be of .txt format".to_string(),
            ),
            ApiError::MalformedBody { status, message } => (*status, "Bad request", message.clone()),
            ApiError::RequestTimeout => (
                StatusCode::REQUEST_TIMEOUT,
                "Request Timeout",
                "Request timed out".to_string(),
            ),
            ApiError::Extraction(err) => extraction_parts(err),
        };

        (
            status,
            ErrorResponse {
                error: error.to_string(),
                message,
            },
        )
    }
}

fn extraction_parts(err: &ExtractionError) -> (StatusCode, &'static str, String) {
    match err {
        ExtractionError::TokenLimitExceeded { .. } => {
            (StatusCode::BAD_REQUEST, "Content too large", err.to_string())
        }
        ExtractionError::CountTokens(_) => {
            (StatusCode::BAD_REQUEST, "Failed to count tokens", err.to_string())
        }
        ExtractionError::Parse(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Response parsing failed",
            "Invalid response generated".to_string(),
        ),
        ExtractionError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request", err.to_string()),
        ExtractionError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded",
            "Too many requests. Please try again later.".to_string(),
        ),
        ExtractionError::Cancelled => (
            client_closed_request(),
            "Request cancelled",
            "Request was cancelled by client.".to_string(),
        ),
        ExtractionError::Internal => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            "Internal server error. Please retry after a few seconds.".to_string(),
        ),
        ExtractionError::Network => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service unavailable",
            "Unable to connect. Please try again later.".to_string(),
        ),
        ExtractionError::UpstreamTimeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "Request Timeout",
            "Request timeout".to_string(),
        ),
        ExtractionError::Api { .. } | ExtractionError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Processing failed",
            "An unexpected error occurred while processing your meeting notes.".to_string(),
        ),
    }
}

/// Non-standard 499 "Client Closed Request"
fn client_closed_request() -> StatusCode {
    StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}
