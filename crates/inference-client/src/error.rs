use survival_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Invalid passenger attributes: {0}")]
    Validation(#[from] CoreError),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    #[error("Request to inference endpoint timed out")]
    Timeout,

    #[error("Inference endpoint returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout
        } else {
            InferenceError::RequestFailed(e)
        }
    }
}


pub type InferenceResult<T> = Result<T, InferenceError>;
