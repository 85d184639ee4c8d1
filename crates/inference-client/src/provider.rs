use async_trait::async_trait;
use survival_core::{PassengerAttributes, PredictRequest, PredictionResult};

use crate::error::InferenceResult;
use crate::InferenceClient;

/// Backend-agnostic interface for survival inference.
///
/// The gateway only sees this trait; tests swap in stubs.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn predict(&self, attrs: &PassengerAttributes) -> InferenceResult<PredictionResult>;

    /// Validate a raw request, then predict. Nothing is sent for invalid input.
    async fn predict_request(&self, request: PredictRequest) -> InferenceResult<PredictionResult> {
        let attrs = PassengerAttributes::try_from(request)?;
        self.predict(&attrs).await
    }

    /// Like `predict`, but any failure becomes the "Unable to make prediction"
    /// sentinel with zero confidence.
    async fn predict_or_sentinel(&self, attrs: &PassengerAttributes) -> PredictionResult {
        match self.predict(attrs).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Prediction error");
                PredictionResult::unable_to_make_prediction()
            }
        }
    }

    fn backend_name(&self) -> &'static str;
}

/// HTTP-backed implementation that delegates to `InferenceClient`.
pub struct HttpInferenceProvider {
    client: InferenceClient,
}

impl HttpInferenceProvider {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}

impl From<InferenceClient> for HttpInferenceProvider {
    fn from(client: InferenceClient) -> Self {
        Self::new(client)
    }
}

#[async_trait]
impl InferenceProvider for HttpInferenceProvider {
    async fn predict(&self, attrs: &PassengerAttributes) -> InferenceResult<PredictionResult> {
        self.client.predict(attrs).await
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
