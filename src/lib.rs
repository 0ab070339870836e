pub mod config;
pub mod extraction;
pub mod gemini;
pub mod http;

pub use config::Config;
pub use extraction::{ActionItem, ExtractionError, ExtractionResult, Extractor};
pub use gemini::GeminiClient;
pub use http::{create_router, ApiError, AppState, ErrorResponse};
