use std::sync::Arc;

use eyre::{Context, Result};
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{debug, info};

use pipelineorchestrator::{CloudFormationStacks, CodePipelineStates, Orchestrator, S3ArtifactStore};
use pipelineparams::Config;

fn setup_logging(level_str: Option<&str>) -> Result<()> {
    let level = match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown LOG_LEVEL '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;
    config.validate().context("Invalid orchestrator environment")?;

    debug!(?config, "main: loaded config");

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let orchestrator = Arc::new(Orchestrator::new(
        config,
        Arc::new(S3ArtifactStore::new(aws_sdk_s3::Client::new(&sdk_config))),
        Arc::new(CloudFormationStacks::new(aws_sdk_cloudformation::Client::new(&sdk_config))),
        Arc::new(CodePipelineStates::new(aws_sdk_codepipeline::Client::new(&sdk_config))),
    ));

    info!("Pipeline orchestrator ready");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let orchestrator = orchestrator.clone();
        async move { Ok::<_, lambda_runtime::Error>(orchestrator.run(event.payload).await) }
    }))
    .await
    .map_err(|e| eyre::eyre!(e))
}
