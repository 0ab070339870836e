pub mod client;
pub mod messages;

pub use client::GeminiClient;
pub use messages::{CountTokensResponse, GenerateContentResponse};
