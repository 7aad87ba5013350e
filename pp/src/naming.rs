//! Names and locations derived from a request: stack names, template
//! locations, S3 path pieces and random job-name suffixes

use crate::error::{ParamsError, Result};
use crate::event::PipelineEvent;
use crate::pipeline::PipelineType;

/// Template for a CodePipeline deployment in the orchestrator account
pub const SINGLE_ACCOUNT_CODEPIPELINE: &str = "single_account_codepipeline";
/// Template for a CodePipeline deployment promoting through StackSets
pub const MULTI_ACCOUNT_CODEPIPELINE: &str = "multi_account_codepipeline";

/// Strip trailing `/` from an S3 location
pub fn clean_param(param: &str) -> &str {
    param.trim_end_matches('/')
}

/// First `/`-separated segment of an S3 location, i.e. the bucket name
pub fn first_segment(location: &str) -> &str {
    location.split('/').next().unwrap_or_default()
}

/// Random lowercase hex suffix of `len` characters (at most 32)
pub fn short_suffix(len: usize) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..len.min(id.len())].to_string()
}

/// Template location for a pipeline type or one of the codepipeline templates
///
/// Codepipeline templates are full URLs in the blueprint bucket; pipeline
/// templates are object keys inside it.
pub fn template_url(name: &str, blueprint_bucket_url: &str) -> Result<String> {
    let key = match name {
        "byom_realtime_builtin" | "byom_realtime_custom" => "blueprints/byom_realtime_inference_pipeline.yaml",
        "byom_batch_builtin" | "byom_batch_custom" => "blueprints/byom_batch_pipeline.yaml",
        "byom_data_quality_monitor" => "blueprints/byom_data_quality_monitor.yaml",
        "byom_model_quality_monitor" => "blueprints/byom_model_quality_monitor.yaml",
        "byom_model_bias_monitor" => "blueprints/byom_model_bias_monitor.yaml",
        "byom_model_explainability_monitor" => "blueprints/byom_model_explainability_monitor.yaml",
        "model_training_builtin" => "blueprints/model_training_pipeline.yaml",
        "model_tuner_builtin" => "blueprints/model_hyperparameter_tuning_pipeline.yaml",
        "model_autopilot_training" => "blueprints/autopilot_training_pipeline.yaml",
        "byom_image_builder" => {
            return Ok(format!(
                "https://{}/blueprints/byom_custom_algorithm_image_builder.yaml",
                blueprint_bucket_url
            ));
        }
        SINGLE_ACCOUNT_CODEPIPELINE | MULTI_ACCOUNT_CODEPIPELINE => {
            return Ok(format!("https://{}/blueprints/{}.yaml", blueprint_bucket_url, name));
        }
        other => {
            return Err(ParamsError::bad_request(format!(
                "Bad request. Pipeline type: {} is not supported.",
                other
            )));
        }
    };
    Ok(key.to_string())
}

/// File name part of a template key (`blueprints/x.yaml` -> `x.yaml`)
pub fn template_file_name(template_key: &str) -> &str {
    template_key.rsplit('/').next().unwrap_or(template_key)
}

/// Name of the stack provisioning the requested pipeline, lowercased
pub fn stack_name(event: &PipelineEvent, pipeline_type: PipelineType, pipeline_stack_name: &str) -> String {
    let subject = match pipeline_type {
        PipelineType::ByomImageBuilder => event.string("image_tag"),
        _ => event.string("model_name").trim().to_lowercase(),
    };
    format!("{}-{}-{}", pipeline_stack_name, subject, stack_postfix(pipeline_type)).to_lowercase()
}

fn stack_postfix(pipeline_type: PipelineType) -> &'static str {
    match pipeline_type {
        PipelineType::ByomRealtimeBuiltin => "BYOMPipelineRealtimeBuiltIn",
        PipelineType::ByomRealtimeCustom => "BYOMPipelineRealtimeCustom",
        PipelineType::ByomBatchBuiltin => "BYOMPipelineBatchBuiltIn",
        PipelineType::ByomBatchCustom => "BYOMPipelineBatchCustom",
        PipelineType::ByomDataQualityMonitor => "BYOMDataQualityMonitor",
        PipelineType::ByomModelQualityMonitor => "BYOMModelQualityMonitor",
        PipelineType::ByomModelBiasMonitor => "BYOMModelBiasMonitor",
        PipelineType::ByomModelExplainabilityMonitor => "BYOMModelExplainabilityMonitor",
        PipelineType::ModelTrainingBuiltin => "ModelTrainingBuiltIn",
        PipelineType::ModelTunerBuiltin => "ModelTunerBuiltIn",
        PipelineType::ModelAutopilotTraining => "ModelAutopilotTraining",
        PipelineType::ByomImageBuilder => "BYOMPipelineImageBuilder",
    }
}
