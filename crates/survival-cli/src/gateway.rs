use anyhow::{Context, Result};
use std::time::Duration;
use survival_core::{ErrorBody, PredictRequest, PredictionResult};

/// Reply from the prediction gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    Prediction(PredictionResult),
    Failure { status: u16, body: ErrorBody },
}

impl GatewayReply {
    /// What the user gets to see: failures collapse to "Prediction failed".
    pub fn into_result(self) -> PredictionResult {
        match self {
            GatewayReply::Prediction(result) => result,
            GatewayReply::Failure { .. } => PredictionResult::failed(),
        }
    }
}

pub struct GatewayClient {
    client: reqwest::Client,
    url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create HTTP client")?;
        let url = format!("{}/predict", base_url.trim_end_matches('/'));
        Ok(Self { client, url })
    }

    pub async fn predict(&self, request: &PredictRequest) -> Result<GatewayReply> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?;

        let status = response.status();
        if status.is_success() {
            let result = response
                .json::<PredictionResult>()
                .await
                .context("Invalid response from prediction service")?;
            return Ok(GatewayReply::Prediction(result));
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_else(|_| ErrorBody {
            error: "Prediction service error".to_string(),
            details: status.to_string(),
        });
        Ok(GatewayReply::Failure {
            status: status.as_u16(),
            body,
        })
    }
}
