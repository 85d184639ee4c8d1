use serde_json::Value;
use survival_core::{encode, FeatureVector, PassengerAttributes, PredictionResult};

use crate::error::{InferenceError, InferenceResult};
use crate::response::normalize;
use crate::InferenceConfig;

/// Client for the hosted survival classifier.
///
/// Owns one `reqwest::Client` (and with it the connection pool); clone it
/// freely, clones share the pool.
#[derive(Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    config: InferenceConfig,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> InferenceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InferenceError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Encode, call the endpoint and normalize whatever comes back.
    pub async fn predict(&self, attrs: &PassengerAttributes) -> InferenceResult<PredictionResult> {
        let features = encode(attrs);
        let body = self.infer_raw(&features).await?;
        Ok(normalize(&body, &self.config.normalize))
    }

    /// Send the feature payload and return the raw JSON body.
    ///
    /// The payload goes out as a single JSON string, e.g. `"0.3 1 2 0 0"`.
    pub async fn infer_raw(&self, features: &FeatureVector) -> InferenceResult<Value> {
        let payload = features.to_payload();
        tracing::debug!(payload = %payload, endpoint = %self.config.endpoint, "Calling inference endpoint");

        let mut request = self.client.post(&self.config.endpoint).json(&payload);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(InferenceError::UpstreamStatus {
                status: status.as_u16(),
                message: upstream_message(&bytes),
            });
        }

        let body: Value = serde_json::from_slice(&bytes)?;
        tracing::debug!(body = %body, "Inference endpoint response");
        Ok(body)
    }
}

/// Best-effort error text from a failed upstream response.
fn upstream_message(bytes: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) {
        if let Some(msg) = map.get("error").and_then(Value::as_str) {
            return msg.to_string();
        }
    }
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.is_empty() {
        "empty response body".to_string()
    } else {
        text.chars().take(200).collect()
    }
}
