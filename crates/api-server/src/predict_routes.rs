use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use inference_client::InferenceError;
use serde::{Deserialize, Serialize};
use survival_core::{ErrorBody, PredictRequest, PredictionResult};

use crate::request_id::RequestId;
use crate::{AppError, AppState};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}

// ─── Router ─────────────────────────────────────────────────────────────────

pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
}

// ─── Handlers ───────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/predict",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "Survival prediction with confidence", body = PredictionResult),
        (status = 400, description = "Malformed body or attribute out of range", body = ErrorBody),
        (status = 500, description = "Inference endpoint unreachable or failed", body = ErrorBody)
    ),
    tag = "Prediction"
)]
pub async fn predict(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(%request_id, error = %e, "Rejected malformed prediction request");
        AppError::validation(e.body_text())
    })?;

    let result = state.provider.predict_request(request).await.map_err(|e| {
        match &e {
            InferenceError::Validation(core) => tracing::warn!(
                %request_id,
                field = core.field(),
                error = %core,
                "Rejected out-of-range passenger attributes"
            ),
            _ => tracing::error!(
                %request_id,
                error = %e,
                backend = state.provider.backend_name(),
                "Prediction error"
            ),
        }
        AppError::from(e)
    })?;

    tracing::info!(
        %request_id,
        prediction = %result.prediction,
        probability = result.probability,
        "Prediction served"
    );
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Liveness probe", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        backend: state.provider.backend_name().into(),
    })
}
