//! Event routing
//!
//! Events arrive either through API Gateway (`httpMethod` + `path` + a JSON
//! `body` string) or directly from CodePipeline/CodeBuild with the pipeline
//! payload as the event itself.

use std::sync::Arc;

use pipelineparams::{Config, ImageRegistry, PipelineEvent};
use serde_json::Value;
use tracing::{debug, info};

use crate::aws::{ArtifactStore, PipelineStateClient, StackClient};
use crate::error::{OrchestratorError, Result};
use crate::response::ApiResponse;

pub const PROVISION_PATH: &str = "/provisionpipeline";
pub const STATUS_PATH: &str = "/pipelinestatus";

/// Request handler holding settings and AWS clients for the lifetime of the
/// Lambda instance
pub struct Orchestrator {
    pub(crate) config: Config,
    pub(crate) images: ImageRegistry,
    pub(crate) store: Arc<dyn ArtifactStore>,
    pub(crate) stacks: Arc<dyn StackClient>,
    pub(crate) pipelines: Arc<dyn PipelineStateClient>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        store: Arc<dyn ArtifactStore>,
        stacks: Arc<dyn StackClient>,
        pipelines: Arc<dyn PipelineStateClient>,
    ) -> Self {
        let images = ImageRegistry::from_config(&config);
        Self {
            config,
            images,
            store,
            stacks,
            pipelines,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle one invocation; failures become error responses
    pub async fn run(&self, event: Value) -> ApiResponse {
        match self.handle(event).await {
            Ok(response) => response,
            Err(err) => ApiResponse::from_error(&err, self.config.allow_detailed_error_message),
        }
    }

    /// Route an invocation to provisioning or status
    pub async fn handle(&self, event: Value) -> Result<ApiResponse> {
        let method = event.get("httpMethod").and_then(Value::as_str);
        debug!(?method, "handle: called");

        if method == Some("POST") {
            let path = event.get("path").and_then(Value::as_str).unwrap_or_default();
            info!(%path, "API request received");
            return match path {
                PROVISION_PATH => {
                    let body = PipelineEvent::from_value(request_body(&event)?)?;
                    self.provision_pipeline(&body).await
                }
                STATUS_PATH => self.pipeline_status(&request_body(&event)?).await,
                _ => Err(OrchestratorError::bad_request(
                    "Unacceptable event path. Path must be /provisionpipeline or /pipelinestatus",
                )),
            };
        }

        if event.get("pipeline_type").is_some() {
            info!("Direct invocation received");
            let body = PipelineEvent::from_value(event)?;
            return self.provision_pipeline(&body).await;
        }

        Err(OrchestratorError::bad_request(
            "Bad request format. Expected httpMethod or pipeline_type, recevied none. Check documentation for API & config formats.",
        ))
    }
}

/// Decode the JSON `body` string of an API Gateway event
fn request_body(event: &Value) -> Result<Value> {
    match event.get("body") {
        Some(Value::String(body)) => Ok(serde_json::from_str(body)?),
        Some(Value::Object(_)) => Ok(event["body"].clone()),
        _ => Err(OrchestratorError::bad_request(
            "Bad request format. API request does not have a body",
        )),
    }
}
