use super::messages::{
    Content, CountTokensRequest, CountTokensResponse, ErrorEnvelope, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig,
};
use crate::config::GeminiConfig;
use crate::extraction::{build_prompt, response_schema, ExtractionError, Extractor};
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Failure of a single REST call, before it is classified for the caller
#[derive(Debug)]
enum CallError {
    /// Non-2xx response
    Status { status: u16, message: String },
    /// Request never produced a response
    Transport(reqwest::Error),
    /// 2xx response with a body we could not decode
    Decode(String),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::Status { status, message } => write!(f, "HTTP {}: {}", status, message),
            CallError::Transport(e) => write!(f, "transport error: {}", e),
            CallError::Decode(msg) => write!(f, "invalid response body: {}", msg),
        }
    }
}

impl From<CallError> for ExtractionError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Status { status, message } => ExtractionError::from_status(status, &message),
            CallError::Transport(e) if e.is_timeout() => ExtractionError::UpstreamTimeout,
            CallError::Transport(e) if e.is_connect() => ExtractionError::Network,
            CallError::Transport(e) => ExtractionError::Unexpected(e.to_string()),
            CallError::Decode(msg) => ExtractionError::Parse(msg),
        }
    }
}

/// Client for the generative-language REST API
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(format!("loqa-notes/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        info!(
            "Gemini client ready (model={}, base_url={})",
            config.model, config.base_url
        );

        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Count the tokens `prompt` would consume
    ///
    /// Every failure is reported as `ExtractionError::CountTokens`.
    pub async fn count_tokens(&self, prompt: &str) -> Result<u64, ExtractionError> {
        let body = CountTokensRequest {
            contents: vec![Content::user_text(prompt)],
        };

        let response: CountTokensResponse = self
            .call("countTokens", &body)
            .await
            .map_err(|e| {
                warn!("Token count failed: {}", e);
                ExtractionError::CountTokens(e.to_string())
            })?;

        Ok(response.total_tokens)
    }

    /// Generate structured output for `prompt` and return the raw response text
    pub async fn generate_content(&self, prompt: &str) -> Result<String, ExtractionError> {
        let body = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };

        let response: GenerateContentResponse = self.call("generateContent", &body).await?;

        response
            .text()
            .ok_or_else(|| ExtractionError::Parse("model returned no text".to_string()))
    }

    /// Count, enforce the input budget, then generate
    async fn run(&self, notes: &str) -> Result<String, ExtractionError> {
        let prompt = build_prompt(notes);

        let count = self.count_tokens(&prompt).await?;
        info!("Prompt uses {} tokens", count);

        if count > self.config.max_input_tokens {
            return Err(ExtractionError::TokenLimitExceeded {
                count,
                limit: self.config.max_input_tokens,
            });
        }

        self.generate_content(&prompt).await
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, CallError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            method
        );
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(CallError::Transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(CallError::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(CallError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| CallError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Extractor for GeminiClient {
    async fn extract(
        &self,
        notes: &str,
        cancel: CancellationToken,
    ) -> Result<String, ExtractionError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Extraction cancelled before the model replied");
                Err(ExtractionError::Cancelled)
            }
            result = self.run(notes) => result,
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
