//! Pipeline provisioning
//!
//! Validate the request, package the blueprint template with its parameters,
//! then create (or update) the stack that deploys it.

use pipelineparams::naming::{MULTI_ACCOUNT_CODEPIPELINE, SINGLE_ACCOUNT_CODEPIPELINE, template_file_name};
use pipelineparams::{
    ParameterList, PipelineEvent, PipelineType, codepipeline_parameters, package_template, params_files, stack_name,
    template_parameters, template_url, template_zip_name, validate,
};
use serde_json::json;
use tracing::{debug, info};

use crate::aws::StackRequest;
use crate::error::Result;
use crate::handler::Orchestrator;
use crate::response::ApiResponse;

/// What happened to the pipeline stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutcome {
    pub stack_id: String,
    pub message: String,
}

impl Orchestrator {
    /// Provision the pipeline a request describes
    pub async fn provision_pipeline(&self, event: &PipelineEvent) -> Result<ApiResponse> {
        let pipeline_type = validate(event, self.config.use_model_registry)?;
        let stack_name = stack_name(event, pipeline_type, &self.config.pipeline_stack_name);
        info!(%pipeline_type, %stack_name, "Provisioning pipeline");

        let (template, parameters) = if pipeline_type.deploys_through_codepipeline() {
            let multi_account = self.config.multi_account && pipeline_type.supports_multi_account();
            let template_key = template_url(pipeline_type.as_str(), &self.config.blueprint_bucket_url)?;
            let zip_name = template_zip_name(pipeline_type);
            self.create_template_zip_file(event, pipeline_type, &template_key, &zip_name, multi_account)
                .await?;

            let codepipeline = if multi_account {
                MULTI_ACCOUNT_CODEPIPELINE
            } else {
                SINGLE_ACCOUNT_CODEPIPELINE
            };
            (
                template_url(codepipeline, &self.config.blueprint_bucket_url)?,
                codepipeline_parameters(
                    &self.config,
                    multi_account,
                    &stack_name,
                    &zip_name,
                    template_file_name(&template_key),
                ),
            )
        } else {
            (
                template_url(pipeline_type.as_str(), &self.config.blueprint_bucket_url)?,
                template_parameters(event, pipeline_type, &self.config, &self.images, None)?,
            )
        };

        let outcome = self.create_codepipeline_stack(&stack_name, &template, parameters).await?;
        Ok(ApiResponse::ok_json(&json!({
            "message": outcome.message,
            "pipeline_id": outcome.stack_id,
        })))
    }

    /// Download the blueprint template, package it with the derived
    /// parameter file(s) and upload the archive to the assets bucket
    pub async fn create_template_zip_file(
        &self,
        event: &PipelineEvent,
        pipeline_type: PipelineType,
        template_key: &str,
        zip_name: &str,
        multi_account: bool,
    ) -> Result<()> {
        debug!(%template_key, %zip_name, multi_account, "create_template_zip_file: called");
        let template_body = self.store.download(&self.config.blueprint_bucket, template_key).await?;

        let files = params_files(event, pipeline_type, &self.config, &self.images, multi_account)?;
        let archive = package_template(template_file_name(template_key), &template_body, &files)?;

        self.store.upload(&self.config.assets_bucket, zip_name, archive).await?;
        info!(bucket = %self.config.assets_bucket, key = %zip_name, "Uploaded template archive");
        Ok(())
    }

    /// Create the stack, falling back to an update when it already exists
    pub async fn create_codepipeline_stack(
        &self,
        stack_name: &str,
        template_url: &str,
        parameters: ParameterList,
    ) -> Result<StackOutcome> {
        let request = StackRequest {
            stack_name: stack_name.to_string(),
            template_url: template_url.to_string(),
            parameters,
            role_arn: self.config.cfn_role_arn.clone(),
        };

        match self.stacks.create_stack(&request).await {
            Ok(stack_id) => {
                info!(%stack_name, "New stack created successfully");
                Ok(StackOutcome {
                    stack_id,
                    message: "success: stack creation started".to_string(),
                })
            }
            Err(err) if err.is_already_exists() => {
                info!(%stack_name, "Stack already exists, updating");
                self.update_stack(&request).await
            }
            Err(err) => Err(err),
        }
    }

    async fn update_stack(&self, request: &StackRequest) -> Result<StackOutcome> {
        match self.stacks.update_stack(request).await {
            Ok(stack_id) => Ok(StackOutcome {
                stack_id,
                message: format!("Pipeline {} is being updated.", request.stack_name),
            }),
            Err(err) if err.is_no_updates() => {
                info!(stack_name = %request.stack_name, "Stack is up to date");
                Ok(StackOutcome {
                    stack_id: request.stack_name.clone(),
                    message: format!(
                        "Pipeline {} is already provisioned. No updates are to be performed.",
                        request.stack_name
                    ),
                })
            }
            Err(err) => Err(err),
        }
    }
}
