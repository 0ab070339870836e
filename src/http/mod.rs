//! HTTP API server
//!
//! This module exposes meeting-notes extraction over HTTP:
//! - GET / - Liveness check ("hello world")
//! - GET /health - Health check
//! - POST /process-meeting - Upload notes (multipart `file` or JSON `{"file": ...}`)
//!   and receive `{summary, decisions, actionItems}`

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
