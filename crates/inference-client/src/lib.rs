pub mod client;
pub mod error;
pub mod provider;
pub mod response;

pub use client::InferenceClient;
pub use error::{InferenceError, InferenceResult};
pub use provider::{HttpInferenceProvider, InferenceProvider};
pub use response::{normalize, NormalizeOptions, ResponseShape};

use std::fmt;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/Xenova/titanic-survival-prediction";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the remote inference endpoint
#[derive(Clone)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub normalize: NormalizeOptions,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            normalize: NormalizeOptions::default(),
        }
    }
}

impl InferenceConfig {
    /// Reads `INFERENCE_URL`, `INFERENCE_API_TOKEN`, `INFERENCE_TIMEOUT_SECS`
    /// and `TEXT_RESPONSE_CONFIDENCE`.
    pub fn from_env() -> InferenceResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> InferenceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let endpoint = lookup("INFERENCE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.endpoint);
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(InferenceError::Config(format!(
                "INFERENCE_URL must be an http(s) URL, got {endpoint:?}"
            )));
        }

        let api_token = lookup("INFERENCE_API_TOKEN").filter(|s| !s.trim().is_empty());

        let timeout = match lookup("INFERENCE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    InferenceError::Config(format!("INFERENCE_TIMEOUT_SECS: invalid value {raw:?}"))
                })?;
                if secs == 0 {
                    return Err(InferenceError::Config(
                        "INFERENCE_TIMEOUT_SECS must be positive".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        let text_confidence = match lookup("TEXT_RESPONSE_CONFIDENCE") {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    InferenceError::Config(format!("TEXT_RESPONSE_CONFIDENCE: invalid value {raw:?}"))
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(InferenceError::Config(
                        "TEXT_RESPONSE_CONFIDENCE must be between 0 and 1".into(),
                    ));
                }
                value
            }
            None => defaults.normalize.text_confidence,
        };

        Ok(Self {
            endpoint,
            api_token,
            timeout,
            normalize: NormalizeOptions { text_confidence },
        })
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "****"))
            .field("timeout", &self.timeout)
            .field("normalize", &self.normalize)
            .finish()
    }
}
