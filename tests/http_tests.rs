use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use loqa_notes::{
    create_router, AppState, ErrorResponse, ExtractionError, ExtractionResult, Extractor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const BOUNDARY: &str = "loqa-notes-test-boundary";

const SAMPLE_SUMMARY: &str = r#"{
    "summary": "Weekly sync about the v2 launch.",
    "decisions": ["Ship v2 on Friday"],
    "actionItems": [
        {"task": "Write release notes", "owner": "Alice", "due": "Thursday"},
        {"task": "Update docs", "owner": null, "due": null}
    ]
}"#;

// ============================================================================
// Fake extractor
// ============================================================================

enum Behavior {
    Respond(String),
    Fail(ExtractionError),
    /// Never finishes on its own
    Hang,
}

struct FakeExtractor {
    behavior: Behavior,
    calls: AtomicUsize,
    last_notes: Mutex<Option<String>>,
    last_token: Mutex<Option<CancellationToken>>,
}

impl FakeExtractor {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_notes: Mutex::new(None),
            last_token: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Extractor for FakeExtractor {
    async fn extract(
        &self,
        notes: &str,
        cancel: CancellationToken,
    ) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_notes.lock().unwrap() = Some(notes.to_string());
        *self.last_token.lock().unwrap() = Some(cancel.clone());

        match &self.behavior {
            Behavior::Respond(text) => Ok(text.clone()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn app(extractor: Arc<FakeExtractor>) -> Router {
    create_router(AppState::new(extractor))
}

fn multipart_request(field: &str, file_name: Option<&str>, content: &str) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n",
            field, name
        ),
        None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
    };
    let body = format!(
        "--{b}\r\n{d}\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        d = disposition,
        c = content
    );

    Request::builder()
        .method("POST")
        .uri("/process-meeting")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process-meeting")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn error_body(response: Response) -> ErrorResponse {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test]
async fn test_root_says_hello() {
    let response = app(FakeExtractor::new(Behavior::Hang))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"hello world");
}

#[tokio::test]
async fn test_health_check() {
    let response = app(FakeExtractor::new(Behavior::Hang))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Successful extraction
// ============================================================================

#[tokio::test]
async fn test_txt_upload_returns_summary() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let response = app(extractor.clone())
        .oneshot(multipart_request(
            "file",
            Some("standup.txt"),
            "Alice: release notes by Thursday",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result: ExtractionResult = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(result.decisions, vec!["Ship v2 on Friday".to_string()]);
    assert_eq!(result.action_items.len(), 2);
    assert_eq!(result.action_items[0].owner.as_deref(), Some("Alice"));
    assert_eq!(result.action_items[1].owner, None);

    assert_eq!(extractor.calls(), 1);
    assert_eq!(
        extractor.last_notes.lock().unwrap().as_deref(),
        Some("Alice: release notes by Thursday")
    );
}

#[tokio::test]
async fn test_json_body_returns_summary() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let response = app(extractor.clone())
        .oneshot(json_request(serde_json::json!({ "file": "Bob owns the migration" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result: ExtractionResult = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(result.summary, "Weekly sync about the v2 launch.");
    assert_eq!(
        extractor.last_notes.lock().unwrap().as_deref(),
        Some("Bob owns the migration")
    );
}

#[tokio::test]
async fn test_multipart_text_field_is_accepted() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let response = app(extractor.clone())
        .oneshot(multipart_request("file", None, "notes sent as a form field"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn test_unexpected_shape_is_returned_as_is() {
    let extractor = FakeExtractor::new(Behavior::Respond(r#"{"summary":"short"}"#.to_string()));
    let response = app(extractor)
        .oneshot(json_request(serde_json::json!({ "file": "notes" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(value, serde_json::json!({ "summary": "short" }));
}

// ============================================================================
// Input validation
// ============================================================================

#[tokio::test]
async fn test_whitespace_upload_is_rejected_without_remote_call() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let response = app(extractor.clone())
        .oneshot(multipart_request("file", Some("empty.txt"), "  \n\t  "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(body.error, "Empty input");
    assert_eq!(body.message, "The provided file is empty");
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_empty_json_field_is_rejected() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let response = app(extractor.clone())
        .oneshot(json_request(serde_json::json!({ "file": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_missing_body_is_empty_input() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let request = Request::builder()
        .method("POST")
        .uri("/process-meeting")
        .body(Body::empty())
        .unwrap();
    let response = app(extractor.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(response).await.error, "Empty input");
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_non_txt_upload_is_rejected() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let response = app(extractor.clone())
        .oneshot(multipart_request("file", Some("notes.pdf"), "real content"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(body.error, "Invalid file type");
    assert_eq!(body.message, "The provided file must be of .txt format");
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let request = Request::builder()
        .method("POST")
        .uri("/process-meeting")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app(extractor.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(response).await.error, "Bad request");
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_non_string_json_field_is_unprocessable() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let response = app(extractor.clone())
        .oneshot(json_request(serde_json::json!({ "file": 123 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_body(response).await.error, "Bad request");
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let app = create_router(AppState::new(extractor.clone()).with_max_upload_bytes(64));
    let response = app
        .oneshot(multipart_request("file", Some("big.txt"), &"x".repeat(1024)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(extractor.calls(), 0);
}

// ============================================================================
// Extraction failures
// ============================================================================

async fn status_for(err: ExtractionError) -> (StatusCode, ErrorResponse) {
    let response = app(FakeExtractor::new(Behavior::Fail(err)))
        .oneshot(json_request(serde_json::json!({ "file": "notes" })))
        .await
        .unwrap();
    let status = response.status();
    (status, error_body(response).await)
}

#[tokio::test]
async fn test_rate_limit_maps_to_429() {
    let (status, body) = status_for(ExtractionError::RateLimited).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body.message, "Too many requests. Please try again later.");
}

#[tokio::test]
async fn test_network_error_maps_to_503() {
    let (status, body) = status_for(ExtractionError::Network).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.error, "Service unavailable");
}

#[tokio::test]
async fn test_upstream_timeout_maps_to_504() {
    let (status, _) = status_for(ExtractionError::UpstreamTimeout).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_cancelled_maps_to_499() {
    let (status, body) = status_for(ExtractionError::Cancelled).await;
    assert_eq!(status.as_u16(), 499);
    assert_eq!(body.error, "Request cancelled");
}

#[tokio::test]
async fn test_unclassified_failure_maps_to_500() {
    let (status, body) = status_for(ExtractionError::Api {
        status: 403,
        message: "permission denied".to_string(),
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.error, "Processing failed");
}

#[tokio::test]
async fn test_count_tokens_failure_maps_to_400() {
    let (status, body) = status_for(ExtractionError::CountTokens("HTTP 500".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "Failed to count tokens");
    assert_eq!(body.message, "Failed to count tokens");
}

#[tokio::test]
async fn test_invalid_model_output_maps_to_500() {
    let extractor = FakeExtractor::new(Behavior::Respond("not json at all".to_string()));
    let response = app(extractor)
        .oneshot(json_request(serde_json::json!({ "file": "notes" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = error_body(response).await;
    assert_eq!(body.error, "Response parsing failed");
    assert_eq!(body.message, "Invalid response generated");
}

// ============================================================================
// Timeout
// ============================================================================

#[tokio::test]
async fn test_slow_extraction_times_out_with_408_and_is_cancelled() {
    let extractor = FakeExtractor::new(Behavior::Hang);
    let app = create_router(
        AppState::new(extractor.clone()).with_request_timeout(Duration::from_millis(50)),
    );

    let response = app
        .oneshot(json_request(serde_json::json!({ "file": "long meeting" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let body = error_body(response).await;
    assert_eq!(body.error, "Request Timeout");
    assert_eq!(body.message, "Request timed out");

    assert_eq!(extractor.calls(), 1);
    let token = extractor.last_token.lock().unwrap().clone().unwrap();
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_extraction_within_deadline_succeeds() {
    let extractor = FakeExtractor::new(Behavior::Respond(SAMPLE_SUMMARY.to_string()));
    let app = create_router(
        AppState::new(extractor.clone()).with_request_timeout(Duration::from_secs(5)),
    );

    let response = app
        .oneshot(json_request(serde_json::json!({ "file": "quick sync" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
