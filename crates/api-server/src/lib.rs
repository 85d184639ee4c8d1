//! Inference gateway: validates passenger attributes, forwards the encoded
//! feature vector to the hosted model and returns a normalized prediction.

pub mod cors;
pub mod predict_routes;
pub mod request_id;

#[cfg(test)]
mod router_tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use inference_client::{
    HttpInferenceProvider, InferenceClient, InferenceConfig, InferenceError, InferenceProvider,
};
use survival_core::ErrorBody;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub const VALIDATION_ERROR: &str = "Invalid passenger attributes";
pub const PREDICTION_ERROR: &str = "Failed to make prediction";

// ─── State ──────────────────────────────────────────────────────────────────

/// Shared, read-only state. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn InferenceProvider>,
}

impl AppState {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self { provider }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: &'static str,
    details: String,
}

impl AppError {
    pub fn validation(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: VALIDATION_ERROR,
            details: details.into(),
        }
    }

    pub fn prediction_failed(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: PREDICTION_ERROR,
            details: details.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<InferenceError> for AppError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::Validation(core) => AppError::validation(core.to_string()),
            other => AppError::prediction_failed(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error.to_string(),
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

// ─── OpenAPI ────────────────────────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    paths(predict_routes::predict, predict_routes::health),
    components(schemas(
        survival_core::PredictRequest,
        survival_core::PredictionResult,
        survival_core::Verdict,
        survival_core::ErrorBody,
        predict_routes::HealthResponse
    )),
    tags(
        (name = "Prediction", description = "Titanic survival prediction"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// ─── Router ─────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(predict_routes::predict_routes())
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(middleware::from_fn(cors::cors_middleware))
}

// ─── Config ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("API_PORT must be a port number")?;
        Ok(Self { host, port })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let server = ServerConfig::from_env()?;
    let inference = InferenceConfig::from_env().context("invalid inference configuration")?;
    tracing::info!(
        endpoint = %inference.endpoint,
        timeout_secs = inference.timeout.as_secs(),
        authenticated = inference.api_token.is_some(),
        "Inference endpoint configured"
    );

    let client = InferenceClient::new(inference)?;
    let state = AppState::new(Arc::new(HttpInferenceProvider::from(client)));
    let app = build_router(state);

    let addr = server.addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Titanic survival gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
