//! Meeting-notes extraction
//!
//! This module holds everything the HTTP layer needs to know about extraction
//! without depending on a particular model provider:
//! - `ExtractionResult` / `ActionItem` - the structured summary shape
//! - `ExtractionError` - tagged failure kinds, consumed by exhaustive matching
//! - `Extractor` - the injectable seam implemented by `GeminiClient` and test fakes
//! - prompt text and the structured output schema sent to the model

mod error;
mod extractor;
mod prompt;
mod types;

pub use error::ExtractionError;
pub use extractor::Extractor;
pub use prompt::{build_prompt, response_schema};
pub use types::{ActionItem, ExtractionResult};
