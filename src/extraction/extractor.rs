use super::ExtractionError;
use tokio_util::sync::CancellationToken;

/// Extraction backend trait
///
/// Implementations:
/// - `GeminiClient`: remote generative-language API
/// - test fakes: canned responses, failures, or calls that never finish
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Extract a summary from raw meeting notes
    ///
    /// Returns the model's raw output text, expected to be a JSON-encoded
    /// `ExtractionResult`. Implementations must stop work and return
    /// `ExtractionError::Cancelled` once `cancel` fires.
    async fn extract(&self, notes: &str, cancel: CancellationToken)
        -> Result<String, ExtractionError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
