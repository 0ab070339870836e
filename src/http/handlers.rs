use super::error::ApiError;
use super::state::AppState;
use crate::extraction::{ExtractionError, ExtractionResult};
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Multipart field (or JSON key) carrying the notes
const UPLOAD_FIELD: &str = "file";

/// Required extension for uploaded files
const UPLOAD_EXTENSION: &str = ".txt";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProcessMeetingRequest {
    /// Raw meeting notes
    pub file: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
/// Liveness check
pub async fn hello() -> &'static str {
    "hello world"
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// POST /process-meeting
/// Extract summary, decisions and action items from uploaded notes
pub async fn process_meeting(State(state): State<AppState>, request: Request) -> Response {
    let request_id = uuid::Uuid::new_v4();

    respond_within_deadline(state, request)
        .instrument(info_span!("process_meeting", %request_id))
        .await
}

async fn respond_within_deadline(state: AppState, request: Request) -> Response {
    let cancel = CancellationToken::new();
    // Cancels the extraction on every exit path, including a dropped connection
    let _cancel_on_exit = cancel.clone().drop_guard();

    let work = process(&state, request, cancel.child_token());

    match tokio::time::timeout(state.request_timeout, work).await {
        Ok(Ok(summary)) => (StatusCode::OK, Json(summary)).into_response(),
        Ok(Err(e)) => {
            error!("Failed to process meeting notes: {}", e);
            e.into_response()
        }
        Err(_) => {
            cancel.cancel();
            warn!(
                "Request exceeded {:?}, extraction cancelled",
                state.request_timeout
            );
            ApiError::RequestTimeout.into_response()
        }
    }
}

async fn process(
    state: &AppState,
    request: Request,
    cancel: CancellationToken,
) -> Result<Value, ApiError> {
    let notes = read_notes(request).await?;

    if notes.trim().is_empty() {
        return Err(ApiError::EmptyInput);
    }

    info!(
        "Extracting from {} bytes of notes via {}",
        notes.len(),
        state.extractor.name()
    );

    let text = state.extractor.extract(&notes, cancel).await?;

    let summary: Value =
        serde_json::from_str(&text).map_err(|e| ExtractionError::Parse(e.to_string()))?;

    if let Err(e) = serde_json::from_value::<ExtractionResult>(summary.clone()) {
        warn!("Model output does not match the summary shape: {}", e);
    }

    info!("Meeting notes processed");

    Ok(summary)
}

// ============================================================================
// Body Reading
// ============================================================================

/// Read notes from a multipart upload or a JSON body
///
/// Requests with any other content type carry no notes.
async fn read_notes(request: Request) -> Result<String, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        read_multipart(request).await
    } else if content_type.starts_with("application/json") {
        read_json(request).await
    } else {
        debug!("No notes in body (content-type: {:?})", content_type);
        Ok(String::new())
    }
}

async fn read_multipart(request: Request) -> Result<String, ApiError> {
    let mut multipart =
        Multipart::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::MalformedBody {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;

    let mut notes = String::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                if !file_name.ends_with(UPLOAD_EXTENSION) {
                    warn!("Rejected upload {:?}: not a {} file", file_name, UPLOAD_EXTENSION);
                    return Err(ApiError::InvalidFileType(file_name));
                }

                let bytes = field.bytes().await.map_err(malformed_multipart)?;
                debug!("Received {} ({} bytes)", file_name, bytes.len());

                // An uploaded file takes precedence over a plain text field
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
            None => {
                notes = field.text().await.map_err(malformed_multipart)?;
            }
        }
    }

    Ok(notes)
}

async fn read_json(request: Request) -> Result<String, ApiError> {
    let Json(body) = Json::<ProcessMeetingRequest>::from_request(request, &())
        .await
        .map_err(|rejection| ApiError::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        })?;

    Ok(body.file.unwrap_or_default())
}

fn malformed_multipart(e: MultipartError) -> ApiError {
    ApiError::MalformedBody {
        status: e.status(),
        message: e.body_text(),
    }
}
