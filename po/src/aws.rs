//! AWS service seams
//!
//! The orchestrator talks to S3, CloudFormation and CodePipeline through the
//! traits below so request handling can be exercised without AWS.

use async_trait::async_trait;
use aws_sdk_cloudformation::types::{Capability, OnFailure, Parameter, Tag};
use aws_sdk_codepipeline::primitives::DateTime;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use pipelineparams::ParameterList;
use serde::Serialize;
use tracing::debug;

use crate::error::{OrchestratorError, Result};

/// Blueprint downloads and template archive uploads
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    async fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}

/// Everything needed to create or update a pipeline stack
#[derive(Debug, Clone, PartialEq)]
pub struct StackRequest {
    pub stack_name: String,
    pub template_url: String,
    pub parameters: ParameterList,
    pub role_arn: String,
}

/// A resource of a provisioned stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResource {
    pub resource_type: String,
    pub physical_resource_id: String,
}

/// CloudFormation operations the orchestrator uses
#[async_trait]
pub trait StackClient: Send + Sync {
    /// Start creating the stack, returning its id
    async fn create_stack(&self, request: &StackRequest) -> Result<String>;

    /// Start updating the stack, returning its id
    async fn update_stack(&self, request: &StackRequest) -> Result<String>;

    async fn list_stack_resources(&self, stack_name: &str) -> Result<Vec<StackResource>>;
}

/// CodePipeline state lookup
#[async_trait]
pub trait PipelineStateClient: Send + Sync {
    async fn get_pipeline_state(&self, pipeline_name: &str) -> Result<PipelineState>;
}

/// Convert an SDK failure, keeping the HTTP status and error code
pub fn service_error<E>(operation: &str, err: SdkError<E>) -> OrchestratorError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16()).unwrap_or(500);
    let code = err.code().unwrap_or("Unknown").to_string();
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    debug!(%operation, %status, %code, "service_error: {}", message);
    OrchestratorError::Service {
        operation: operation.to_string(),
        status,
        code,
        message,
    }
}

/// S3-backed artifact store
#[derive(Clone)]
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
}

impl S3ArtifactStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        debug!(%bucket, %key, "S3ArtifactStore::download: called");
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| service_error("GetObject", e))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| OrchestratorError::Internal(format!("Failed to read s3://{}/{}: {}", bucket, key, e)))?;
        Ok(bytes.into_bytes().to_vec())
    }

    async fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        debug!(%bucket, %key, size = body.len(), "S3ArtifactStore::upload: called");
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("application/zip")
            .send()
            .await
            .map_err(|e| service_error("PutObject", e))?;
        Ok(())
    }
}

/// CloudFormation-backed stack client
#[derive(Clone)]
pub struct CloudFormationStacks {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationStacks {
    pub fn new(client: aws_sdk_cloudformation::Client) -> Self {
        Self { client }
    }
}

fn cfn_parameters(parameters: &ParameterList) -> Vec<Parameter> {
    parameters
        .iter()
        .map(|(key, value)| Parameter::builder().parameter_key(key).parameter_value(value).build())
        .collect()
}

fn stack_name_tag(stack_name: &str) -> Result<Tag> {
    Ok(Tag::builder().key("stack_name").value(stack_name).build())
}

/// Deployment role, unset when not configured
fn role_arn(request: &StackRequest) -> Option<String> {
    (!request.role_arn.is_empty()).then(|| request.role_arn.clone())
}

#[async_trait]
impl StackClient for CloudFormationStacks {
    async fn create_stack(&self, request: &StackRequest) -> Result<String> {
        debug!(stack_name = %request.stack_name, "CloudFormationStacks::create_stack: called");
        let output = self
            .client
            .create_stack()
            .stack_name(&request.stack_name)
            .template_url(&request.template_url)
            .set_parameters(Some(cfn_parameters(&request.parameters)))
            .capabilities(Capability::CapabilityIam)
            .on_failure(OnFailure::DoNothing)
            .set_role_arn(role_arn(request))
            .tags(stack_name_tag(&request.stack_name)?)
            .send()
            .await
            .map_err(|e| service_error("CreateStack", e))?;
        Ok(output.stack_id().unwrap_or_default().to_string())
    }

    async fn update_stack(&self, request: &StackRequest) -> Result<String> {
        debug!(stack_name = %request.stack_name, "CloudFormationStacks::update_stack: called");
        let output = self
            .client
            .update_stack()
            .stack_name(&request.stack_name)
            .template_url(&request.template_url)
            .set_parameters(Some(cfn_parameters(&request.parameters)))
            .capabilities(Capability::CapabilityIam)
            .set_role_arn(role_arn(request))
            .tags(stack_name_tag(&request.stack_name)?)
            .send()
            .await
            .map_err(|e| service_error("UpdateStack", e))?;
        Ok(output.stack_id().unwrap_or_default().to_string())
    }

    async fn list_stack_resources(&self, stack_name: &str) -> Result<Vec<StackResource>> {
        debug!(%stack_name, "CloudFormationStacks::list_stack_resources: called");
        let output = self
            .client
            .list_stack_resources()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| service_error("ListStackResources", e))?;
        Ok(output
            .stack_resource_summaries()
            .iter()
            .map(|r| StackResource {
                resource_type: r.resource_type().unwrap_or_default().to_string(),
                physical_resource_id: r.physical_resource_id().unwrap_or_default().to_string(),
            })
            .collect())
    }
}

/// Pipeline state as reported by `GetPipelineState`, timestamps in ISO-8601
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_version: Option<i32>,
    pub stage_states: Vec<StageState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_execution: Option<StageExecution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_transition_state: Option<TransitionState>,
    pub action_states: Vec<ActionState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_execution: Option<StageExecution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageExecution {
    pub pipeline_execution_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionState {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_revision: Option<ActionRevision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_execution: Option<ActionExecution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRevision {
    pub revision_id: String,
    pub revision_change_id: String,
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionExecution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_execution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_execution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_execution_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn iso8601(dt: &DateTime) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp(dt.secs(), dt.subsec_nanos())
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| dt.to_string())
}

fn owned(s: Option<&str>) -> Option<String> {
    s.map(str::to_string)
}

impl From<&aws_sdk_codepipeline::types::StageExecution> for StageExecution {
    fn from(e: &aws_sdk_codepipeline::types::StageExecution) -> Self {
        Self {
            pipeline_execution_id: e.pipeline_execution_id().to_string(),
            status: e.status().as_str().to_string(),
        }
    }
}

impl From<&aws_sdk_codepipeline::types::ActionState> for ActionState {
    fn from(a: &aws_sdk_codepipeline::types::ActionState) -> Self {
        Self {
            action_name: owned(a.action_name()),
            current_revision: a.current_revision().map(|r| ActionRevision {
                revision_id: r.revision_id().to_string(),
                revision_change_id: r.revision_change_id().to_string(),
                created: iso8601(r.created()),
            }),
            latest_execution: a.latest_execution().map(|e| ActionExecution {
                action_execution_id: owned(e.action_execution_id()),
                status: e.status().map(|s| s.as_str().to_string()),
                summary: owned(e.summary()),
                last_status_change: e.last_status_change().map(iso8601),
                token: owned(e.token()),
                last_updated_by: owned(e.last_updated_by()),
                external_execution_id: owned(e.external_execution_id()),
                external_execution_url: owned(e.external_execution_url()),
                percent_complete: e.percent_complete(),
                error_details: e.error_details().map(|d| ErrorDetails {
                    code: owned(d.code()),
                    message: owned(d.message()),
                }),
            }),
            entity_url: owned(a.entity_url()),
            revision_url: owned(a.revision_url()),
        }
    }
}

impl From<&aws_sdk_codepipeline::types::StageState> for StageState {
    fn from(s: &aws_sdk_codepipeline::types::StageState) -> Self {
        Self {
            stage_name: owned(s.stage_name()),
            inbound_execution: s.inbound_execution().map(StageExecution::from),
            inbound_transition_state: s.inbound_transition_state().map(|t| TransitionState {
                enabled: t.enabled(),
                last_changed_by: owned(t.last_changed_by()),
                last_changed_at: t.last_changed_at().map(iso8601),
                disabled_reason: owned(t.disabled_reason()),
            }),
            action_states: s.action_states().iter().map(ActionState::from).collect(),
            latest_execution: s.latest_execution().map(StageExecution::from),
        }
    }
}

/// CodePipeline-backed state client
#[derive(Clone)]
pub struct CodePipelineStates {
    client: aws_sdk_codepipeline::Client,
}

impl CodePipelineStates {
    pub fn new(client: aws_sdk_codepipeline::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PipelineStateClient for CodePipelineStates {
    async fn get_pipeline_state(&self, pipeline_name: &str) -> Result<PipelineState> {
        debug!(%pipeline_name, "CodePipelineStates::get_pipeline_state: called");
        let output = self
            .client
            .get_pipeline_state()
            .name(pipeline_name)
            .send()
            .await
            .map_err(|e| service_error("GetPipelineState", e))?;
        Ok(PipelineState {
            pipeline_name: owned(output.pipeline_name()),
            pipeline_version: output.pipeline_version(),
            stage_states: output.stage_states().iter().map(StageState::from).collect(),
            created: output.created().map(iso8601),
            updated: output.updated().map(iso8601),
        })
    }
}
