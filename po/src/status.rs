//! Pipeline status lookup

use pipelineparams::packaging::to_pretty_json;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{OrchestratorError, Result};
use crate::handler::Orchestrator;
use crate::response::ApiResponse;

const CODEPIPELINE_RESOURCE: &str = "AWS::CodePipeline::Pipeline";

impl Orchestrator {
    /// Report the CodePipeline state of a provisioned pipeline stack
    ///
    /// `event` carries the stack name as `pipeline_id`.
    pub async fn pipeline_status(&self, event: &Value) -> Result<ApiResponse> {
        let stack_name = event.get("pipeline_id").and_then(Value::as_str).ok_or_else(|| {
            OrchestratorError::bad_request("Bad request. API body does not have the necessary parameter: pipeline_id")
        })?;
        debug!(%stack_name, "pipeline_status: called");

        let resources = self.stacks.list_stack_resources(stack_name).await?;
        let Some(pipeline) = resources.iter().rfind(|r| r.resource_type == CODEPIPELINE_RESOURCE) else {
            info!(%stack_name, "Stack has no CodePipeline resource yet");
            return Ok(ApiResponse::ok(
                "pipeline cloudformation stack has not provisioned the pipeline yet.",
            ));
        };

        let state = self.pipelines.get_pipeline_state(&pipeline.physical_resource_id).await?;
        let body = to_pretty_json(&state)?;
        let body = String::from_utf8(body).map_err(|e| OrchestratorError::Internal(e.to_string()))?;
        Ok(ApiResponse::ok(body))
    }
}
