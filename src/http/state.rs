use crate::extraction::Extractor;
use std::sync::Arc;
use std::time::Duration;

/// Default wall-clock budget for one `/process-meeting` request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(150);

/// Default upload size limit (16 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Extraction backend (Gemini in production, fakes in tests)
    pub extractor: Arc<dyn Extractor>,

    /// Timeout covering body upload, extraction and response parsing
    pub request_timeout: Duration,

    /// Maximum accepted request body size
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
