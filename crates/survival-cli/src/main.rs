//! survival-cli: ask the survival gateway (or the hosted model directly) for a
//! prediction, the way the passenger form does.
//!
//! Usage:
//!   cargo run -p survival-cli -- --age 30 --sex male --class 2
//!   cargo run -p survival-cli -- --age 8 --sex female --class 1 --parents 2 --direct

mod args;
mod gateway;

use std::process::ExitCode;
use std::time::Duration;

use args::{parse_args, Target, USAGE};
use gateway::{GatewayClient, GatewayReply};
use inference_client::{HttpInferenceProvider, InferenceClient, InferenceConfig, InferenceProvider};
use survival_core::{PassengerAttributes, PredictionResult, Verdict};

const DEFAULT_GATEWAY: &str = "http://localhost:3000";
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survival_cli=warn,inference_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let default_gateway =
        std::env::var("GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY.to_string());
    let Some(cli) = parse_args(std::env::args().skip(1), &default_gateway)? else {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    };

    let attrs = match PassengerAttributes::try_from(cli.request.clone()) {
        Ok(attrs) => attrs,
        Err(e) => {
            eprintln!("Invalid input: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    let result = match cli.target {
        Target::Direct => {
            let config = InferenceConfig::from_env()?;
            let provider = HttpInferenceProvider::from(InferenceClient::new(config)?);
            provider.predict_or_sentinel(&attrs).await
        }
        Target::Gateway(url) => {
            let client = GatewayClient::new(&url, GATEWAY_TIMEOUT)?;
            match client.predict(&cli.request).await {
                Ok(reply) => {
                    if let GatewayReply::Failure { status, body } = &reply {
                        tracing::error!(status, error = %body.error, details = %body.details, "Prediction failed");
                    }
                    reply.into_result()
                }
                Err(e) => {
                    tracing::error!(error = %e, "Prediction failed");
                    PredictionResult::failed()
                }
            }
        }
    };

    println!("{}", render(&result));
    let failed = matches!(
        result.prediction,
        Verdict::PredictionFailed | Verdict::UnableToMakePrediction
    );
    if failed {
        eprintln!("Unable to get prediction results. Please try again later.");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn render(result: &PredictionResult) -> String {
    format!(
        "Prediction: {}\nConfidence: {}%",
        result.prediction,
        result.display_confidence()
    )
}
