use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `LOQA_NOTES_GEMINI__API_KEY`
pub const ENV_PREFIX: &str = "LOQA_NOTES";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Wall-clock budget for a whole `/process-meeting` request
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Notes whose prompt counts more tokens than this are rejected before generation
    pub max_input_tokens: u64,
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl GeminiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from defaults, an optional file at `path`, `LOQA_NOTES_*`
    /// variables and the legacy `PORT`/`APIKEY` variables, in that order.
    pub fn load(path: &str) -> Result<Self> {
        let legacy_port = std::env::var("PORT")
            .or_else(|_| std::env::var("port"))
            .ok();
        let legacy_api_key = std::env::var("APIKEY").ok();

        let settings = config::Config::builder()
            .set_default("service.name", "loqa-notes")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 3000)?
            .set_default("service.http.request_timeout_secs", 150)?
            .set_default("service.http.max_upload_bytes", 16 * 1024 * 1024)?
            .set_default("gemini.api_key", "")?
            .set_default(
                "gemini.base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.model", "gemini-2.0-flash")?
            .set_default("gemini.max_input_tokens", 1_000_000)?
            .set_default("gemini.request_timeout_secs", 120)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("service.http.port", legacy_port)?
            .set_override_option("gemini.api_key", legacy_api_key)?
            .build()
            .context("Failed to read configuration")?;

        let cfg: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            anyhow::bail!(
                "Missing API key: set APIKEY or {}_GEMINI__API_KEY",
                ENV_PREFIX
            );
        }
        if self.service.http.port == 0 {
            anyhow::bail!("service.http.port must be non-zero");
        }
        if self.service.http.request_timeout_secs == 0 {
            anyhow::bail!("service.http.request_timeout_secs must be non-zero");
        }
        if self.gemini.max_input_tokens == 0 {
            anyhow::bail!("gemini.max_input_tokens must be non-zero");
        }
        Ok(())
    }
}
