use thiserror::Error;

/// Why an extraction failed.
///
/// Display strings are the client-facing messages for the kinds whose
/// message is passed through to the HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The token-count call failed for any reason; the detail is only logged
    #[error("Failed to count tokens")]
    CountTokens(String),

    /// The prompt is larger than the configured input budget
    #[error("Token limit exceeded: {count} tokens. Maximum allowed is {}.", group_thousands(.limit))]
    TokenLimitExceeded { count: u64, limit: u64 },

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Request was cancelled by client")]
    Cancelled,

    #[error("Internal server error. Please retry after a few seconds.")]
    Internal,

    #[error("Network error. Please retry after a few seconds.")]
    Network,

    #[error("Request timeout. Consider increasing the deadline.")]
    UpstreamTimeout,

    /// Any other status reported by the remote API
    #[error("API Error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model's output could not be read as JSON
    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Unexpected extraction failure: {0}")]
    Unexpected(String),
}

impl ExtractionError {
    /// Classify a remote API failure by its HTTP status
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            400 => {
                let message = if message.is_empty() {
                    "Invalid request parameters"
                } else {
                    message
                };
                Self::BadRequest(message.to_string())
            }
            429 => Self::RateLimited,
            499 => Self::Cancelled,
            500 => Self::Internal,
            503 => Self::Network,
            504 => Self::UpstreamTimeout,
            _ => Self::Api {
                status,
                message: message.to_string(),
            },
        }
    }
}

fn group_thousands(n: &u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
