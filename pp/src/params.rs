//! CloudFormation parameter derivation
//!
//! Turns a validated request into the ordered parameter list its blueprint
//! template declares. Key names match the templates' parameter names.

use serde_json::{Map, Value, json};

use crate::config::Config;
use crate::error::Result;
use crate::event::PipelineEvent;
use crate::images::ImageRegistry;
use crate::naming::{clean_param, first_segment, short_suffix};
use crate::pipeline::{MonitoringType, PipelineType, Stage};

/// Ordered CloudFormation parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterList(Vec<(String, String)>);

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn extend(&mut self, other: ParameterList) {
        self.0.extend(other.0);
    }

    /// Value of the first parameter named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parameters for the blueprint template of `pipeline_type`
///
/// `stage` selects the stage entry of multi-account fields; `None` reads
/// plain values.
pub fn template_parameters(
    event: &PipelineEvent,
    pipeline_type: PipelineType,
    config: &Config,
    images: &ImageRegistry,
    stage: Option<Stage>,
) -> Result<ParameterList> {
    log::debug!("template_parameters: {} stage={:?}", pipeline_type, stage);

    if pipeline_type == PipelineType::ByomImageBuilder {
        return Ok(image_builder_params(event, config));
    }

    let mut params: ParameterList = [
        ("AssetsBucket", config.assets_bucket.clone()),
        ("KmsKeyArn", event.stage_param("kms_key_arn", stage)),
        ("BlueprintBucket", config.blueprint_bucket.clone()),
    ]
    .into_iter()
    .collect();

    if pipeline_type.is_inference() {
        params.extend(inference_params(event, pipeline_type, config, images, stage)?);
    } else if let Some(monitoring_type) = pipeline_type.monitoring_type() {
        params.extend(monitor_params(event, monitoring_type, config, images, stage)?);
    } else if pipeline_type == PipelineType::ModelAutopilotTraining {
        params.extend(autopilot_params(event, config));
    } else {
        params.extend(training_params(event, pipeline_type, config, images)?);
    }

    Ok(params)
}

fn inference_params(
    event: &PipelineEvent,
    pipeline_type: PipelineType,
    config: &Config,
    images: &ImageRegistry,
    stage: Option<Stage>,
) -> Result<ParameterList> {
    let model_package_name = event.string("model_package_name");
    let image_uri = if config.use_model_registry {
        String::new()
    } else if pipeline_type.uses_builtin_image() {
        images.framework_image(
            &event.string("model_framework"),
            &event.string("model_framework_version"),
            &config.region,
        )?
    } else {
        event.string("custom_image_uri")
    };

    let mut params: ParameterList = [
        ("ModelName", event.string("model_name")),
        ("ModelArtifactLocation", event.string("model_artifact_location")),
        ("InferenceInstance", event.stage_param("inference_instance", stage)),
        ("CustomAlgorithmsECRRepoArn", config.ecr_repo_arn.clone()),
        ("ImageUri", image_uri),
        (
            "ModelPackageGroupName",
            model_package_name.split('/').nth(1).unwrap_or_default().to_string(),
        ),
        ("ModelPackageName", model_package_name.clone()),
    ]
    .into_iter()
    .collect();

    if pipeline_type.is_realtime() {
        params.push(
            "DataCaptureLocation",
            clean_param(&event.stage_param("data_capture_location", stage)),
        );
        params.push(
            "EndpointName",
            event.stage_param("endpoint_name", stage).trim().to_lowercase(),
        );
    } else {
        let batch_data = event.stage_param("batch_inference_data", stage);
        params.push("BatchInputBucket", first_segment(&batch_data));
        params.push("BatchInferenceData", batch_data.clone());
        params.push(
            "BatchOutputLocation",
            clean_param(&event.stage_param("batch_job_output_location", stage)),
        );
    }

    Ok(params)
}

fn monitor_params(
    event: &PipelineEvent,
    monitoring_type: MonitoringType,
    config: &Config,
    images: &ImageRegistry,
    stage: Option<Stage>,
) -> Result<ParameterList> {
    let endpoint_name = event.stage_param("endpoint_name", stage).trim().to_lowercase();
    let job_prefix = format!("{}-{}", endpoint_name, monitoring_type.as_str().to_lowercase());
    let baseline_job_name = format!("{}-{}", job_prefix, short_suffix(4));
    let schedule_name = format!("{}-{}", job_prefix, short_suffix(4));

    let baseline_output = event.stage_param("baseline_job_output_location", stage);
    let data_capture = event.stage_param("data_capture_location", stage);
    let image_uri = if monitoring_type.uses_clarify() {
        images.clarify_image(&config.region)?
    } else {
        images.model_monitor_image(&config.region)?
    };

    let mut params: ParameterList = [
        ("BaselineJobName", baseline_job_name.clone()),
        ("BaselineOutputBucket", first_segment(&baseline_output).to_string()),
        (
            "BaselineJobOutputLocation",
            format!("{}/{}", clean_param(&baseline_output), baseline_job_name),
        ),
        ("DataCaptureBucket", first_segment(&data_capture).to_string()),
        ("DataCaptureLocation", clean_param(&data_capture).to_string()),
        ("EndpointName", endpoint_name.clone()),
        ("ImageUri", image_uri),
        ("InstanceType", event.stage_param("instance_type", stage)),
        ("InstanceVolumeSize", event.stage_param("instance_volume_size", stage)),
        ("JobInstanceCount", event.str_or("instance_count", "1")),
        ("BaselineMaxRuntimeSeconds", event.stage_param("baseline_max_runtime_seconds", stage)),
        ("MonitorMaxRuntimeSeconds", event.stage_param("monitor_max_runtime_seconds", stage)),
        (
            "MonitoringOutputLocation",
            clean_param(&event.stage_param("monitoring_output_location", stage)).to_string(),
        ),
        ("MonitoringScheduleName", schedule_name),
        ("ScheduleExpression", event.stage_param("schedule_expression", stage)),
        ("BaselineData", event.string("baseline_data")),
    ]
    .into_iter()
    .collect();

    if monitoring_type.is_model_level() {
        params.push("ProblemType", event.string("problem_type"));
        params.push("MonitorInferenceAttribute", event.string("monitor_inference_attribute"));
        params.push("MonitorProbabilityAttribute", event.string("monitor_probability_attribute"));
        params.push("ProbabilityThresholdAttribute", event.string("probability_threshold_attribute"));
    }

    if monitoring_type == MonitoringType::ModelQuality {
        params.push("BaselineInferenceAttribute", event.string("baseline_inference_attribute"));
        params.push("BaselineProbabilityAttribute", event.string("baseline_probability_attribute"));
        params.push("BaselineGroundTruthAttribute", event.string("baseline_ground_truth_attribute"));
    }

    if monitoring_type.needs_ground_truth() {
        let ground_truth = event.stage_param("monitor_ground_truth_input", stage);
        params.push("GroundTruthBucket", first_segment(&ground_truth));
        params.push("MonitorGroundTruthInput", ground_truth.clone());
    }

    match monitoring_type {
        MonitoringType::ModelBias => {
            params.push("ModelPredictedLabelConfig", event.json_param("model_predicted_label_config"));
            params.push("BiasConfig", event.json_param("bias_config"));
        }
        MonitoringType::ModelExplainability => {
            params.push("SHAPConfig", event.json_param("shap_config"));
            params.push("ExplainabilityModelScores", event.json_param("model_scores"));
        }
        _ => {}
    }

    if monitoring_type.uses_clarify() {
        params.push("FeaturesAttribute", event.string("features_attribute"));
    }

    Ok(params)
}

fn image_builder_params(event: &PipelineEvent, config: &Config) -> ParameterList {
    [
        ("NotificationsSNSTopicArn", config.notifications_sns_topic.clone()),
        ("AssetsBucket", config.assets_bucket.clone()),
        ("CustomImage", event.string("custom_algorithm_docker")),
        ("ECRRepoName", event.string("ecr_repo_name")),
        ("ImageTag", event.string("image_tag")),
    ]
    .into_iter()
    .collect()
}

/// `job_name` when given, otherwise the model name plus a random suffix
fn job_name(event: &PipelineEvent) -> String {
    match event.string("job_name") {
        name if !name.is_empty() => name,
        _ => format!("{}-{}", event.string("model_name").trim().to_lowercase(), short_suffix(8)),
    }
}

fn training_params(
    event: &PipelineEvent,
    pipeline_type: PipelineType,
    config: &Config,
    images: &ImageRegistry,
) -> Result<ParameterList> {
    let image_uri = images.framework_image(
        &event.string("model_framework"),
        &event.string("model_framework_version"),
        &config.region,
    )?;

    let mut params: ParameterList = [
        ("JobName", job_name(event)),
        ("ImageUri", image_uri),
        ("InstanceType", event.str_or("instance_type", "ml.m4.xlarge")),
        ("JobInstanceCount", event.str_or("instance_count", "1")),
        ("InstanceVolumeSize", event.str_or("instance_volume_size", "20")),
        ("JobOutputLocation", event.string("job_output_location")),
        ("TrainingData", event.string("training_data")),
        ("ValidationData", event.string("validation_data")),
        ("EncryptInnerTraffic", event.str_or("encrypt_inner_traffic", "True")),
        ("MaxRuntimePerJob", event.str_or("max_runtime_per_job", "86400")),
        ("UseSpotInstances", event.str_or("use_spot_instances", "True")),
        ("MaxWaitTimeForSpotInstances", event.str_or("max_wait_time_spot_instances", "172800")),
        ("ContentType", event.str_or("content_type", "csv")),
        ("S3DataType", event.str_or("s3_data_type", "S3Prefix")),
        ("DataDistribution", event.str_or("data_distribution", "FullyReplicated")),
        ("CompressionType", event.string("compression_type")),
        ("DataInputMode", event.str_or("data_input_mode", "File")),
        ("DataRecordWrapping", event.string("data_record_wrapping")),
        ("AttributeNames", event.string("attribute_names")),
        ("AlgoHyperparameteres", event.json_param("algo_hyperparamaters")),
        ("NotificationsSNSTopicArn", config.notifications_sns_topic.clone()),
    ]
    .into_iter()
    .collect();

    if pipeline_type == PipelineType::ModelTunerBuiltin {
        params.push("HyperparametersTunerConfig", event.json_param("tuner_configs"));
        params.push("AlgoHyperparameteresRange", event.json_param("hyperparamaters_ranges"));
    }

    Ok(params)
}

fn autopilot_params(event: &PipelineEvent, config: &Config) -> ParameterList {
    [
        ("NotificationsSNSTopicArn", config.notifications_sns_topic.clone()),
        ("JobName", job_name(event)),
        ("ProblemType", event.string("problem_type")),
        ("AutopilotJobObjective", event.string("job_objective")),
        ("TrainingData", event.string("training_data")),
        ("TargetAttribute", event.string("target_attribute")),
        ("JobOutputLocation", event.string("job_output_location")),
        ("CompressionType", event.string("compression_type")),
        ("AutopilotMaxCandidates", event.str_or("max_candidates", "10")),
        ("EncryptInnerTraffic", event.str_or("encrypt_inner_traffic", "True")),
        ("MaxRuntimePerJob", event.str_or("max_runtime_per_job", "86400")),
        ("AutopilotTotalRuntime", event.str_or("total_max_runtime", "2592000")),
        ("GenerateDefinitionsOnly", event.str_or("generate_definition_only", "False")),
    ]
    .into_iter()
    .collect()
}

/// Parameters of the codepipeline stack that deploys the packaged template
pub fn codepipeline_parameters(
    config: &Config,
    multi_account: bool,
    stack_name: &str,
    template_zip_name: &str,
    template_file_name: &str,
) -> ParameterList {
    let mut params: ParameterList = [
        ("NotificationsSNSTopicArn", config.notifications_sns_topic.as_str()),
        ("TemplateZipFileName", template_zip_name),
        ("TemplateFileName", template_file_name),
        ("AssetsBucket", config.assets_bucket.as_str()),
        ("StackName", stack_name),
    ]
    .into_iter()
    .collect();

    if !multi_account {
        params.push("TemplateParamsName", "template_params.json");
        return params;
    }

    params.push("DevParamsName", Stage::Dev.params_file_name());
    params.push("StagingParamsName", Stage::Staging.params_file_name());
    params.push("ProdParamsName", Stage::Prod.params_file_name());
    for (prefix, stage) in [("Dev", Stage::Dev), ("Staging", Stage::Staging), ("Prod", Stage::Prod)] {
        let account = config.stage_account(stage);
        params.push(format!("{}AccountId", prefix), account.account_id.clone());
        params.push(format!("{}OrgId", prefix), account.org_id.clone());
    }
    params.push("BlueprintBucket", config.blueprint_bucket.clone());
    params.push("DelegatedAdminAccount", if config.delegated_admin { "Yes" } else { "No" });
    params
}

/// Render parameters for their consumer
///
/// StackSet style (`multi_account`) is a list of
/// `{"ParameterKey", "ParameterValue"}` objects; otherwise the
/// CloudFormation-action style `{"Parameters": {key: value}}`.
pub fn format_template_parameters(params: &ParameterList, multi_account: bool) -> Value {
    if multi_account {
        Value::Array(
            params
                .iter()
                .map(|(k, v)| json!({"ParameterKey": k, "ParameterValue": v}))
                .collect(),
        )
    } else {
        let parameters: Map<String, Value> = params.iter().map(|(k, v)| (k.to_string(), Value::from(v))).collect();
        json!({ "Parameters": parameters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> Config {
        Config {
            blueprint_bucket_url: "blueprints.s3.us-east-1.amazonaws.com".to_string(),
            blueprint_bucket: "blueprints".to_string(),
            assets_bucket: "assets".to_string(),
            region: "us-east-1".to_string(),
            ecr_repo_arn: "arn:aws:ecr:us-east-1:111111111111:repository/algorithms".to_string(),
            notifications_sns_topic: "arn:aws:sns:us-east-1:111111111111:mlops".to_string(),
            ..Config::default()
        }
    }

    fn derive(value: Value, stage: Option<Stage>) -> ParameterList {
        let event = PipelineEvent::from_value(value).unwrap();
        let pipeline_type: PipelineType = event.pipeline_type_raw().parse().unwrap();
        template_parameters(&event, pipeline_type, &config(), &ImageRegistry::default(), stage).unwrap()
    }

    #[test]
    fn test_batch_builtin_params() {
        let params = derive(
            json!({
                "pipeline_type": "byom_batch_builtin",
                "model_name": "My-Model",
                "model_framework": "xgboost",
                "model_framework_version": "1",
                "model_artifact_location": "models/model.tar.gz",
                "inference_instance": "ml.m5.large",
                "batch_inference_data": "inference-bucket/data/input.csv",
                "batch_job_output_location": "output-bucket/results/",
            }),
            None,
        );

        assert_eq!(
            params.keys().take(3).collect::<Vec<_>>(),
            vec!["AssetsBucket", "KmsKeyArn", "BlueprintBucket"]
        );
        assert_eq!(params.get("BatchInputBucket"), Some("inference-bucket"));
        assert_eq!(params.get("BatchInferenceData"), Some("inference-bucket/data/input.csv"));
        assert_eq!(params.get("BatchOutputLocation"), Some("output-bucket/results"));
        assert_eq!(params.get("ModelName"), Some("My-Model"));
        assert_eq!(params.get("KmsKeyArn"), Some(""));
        assert_eq!(
            params.get("ImageUri"),
            Some("683313688378.dkr.ecr.us-east-1.amazonaws.com/sagemaker-xgboost:1")
        );
        assert!(params.get("EndpointName").is_none());
    }

    #[test]
    fn test_realtime_custom_stage_params() {
        let params = derive(
            json!({
                "pipeline_type": "byom_realtime_custom",
                "model_name": "churn",
                "custom_image_uri": "111111111111.dkr.ecr.us-east-1.amazonaws.com/churn:latest",
                "model_artifact_location": "models/churn.tar.gz",
                "inference_instance": {"dev": "ml.t2.medium", "staging": "ml.m5.large", "prod": "ml.m5.xlarge"},
                "data_capture_location": {"dev": "capture/dev/", "staging": "capture/staging/", "prod": "capture/prod/"},
                "endpoint_name": {"dev": " Churn-Dev ", "staging": "churn-staging", "prod": "churn-prod"},
            }),
            Some(Stage::Prod),
        );
        assert_eq!(params.get("InferenceInstance"), Some("ml.m5.xlarge"));
        assert_eq!(params.get("DataCaptureLocation"), Some("capture/prod"));
        assert_eq!(params.get("EndpointName"), Some("churn-prod"));
        assert_eq!(
            params.get("ImageUri"),
            Some("111111111111.dkr.ecr.us-east-1.amazonaws.com/churn:latest")
        );
    }

    #[test]
    fn test_model_registry_params() {
        let event = PipelineEvent::from_value(json!({
            "pipeline_type": "byom_realtime_builtin",
            "model_name": "churn",
            "model_package_name": "arn:aws:sagemaker:us-east-1:111111111111:model-package/churn-group/3",
            "inference_instance": "ml.m5.large",
            "data_capture_location": "capture",
        }))
        .unwrap();
        let mut config = config();
        config.use_model_registry = true;
        let params = template_parameters(
            &event,
            PipelineType::ByomRealtimeBuiltin,
            &config,
            &ImageRegistry::default(),
            None,
        )
        .unwrap();
        assert_eq!(params.get("ImageUri"), Some(""));
        assert_eq!(params.get("ModelPackageGroupName"), Some("churn-group"));
    }

    #[test]
    fn test_data_quality_monitor_params() {
        let params = derive(
            json!({
                "pipeline_type": "byom_data_quality_monitor",
                "model_name": "churn",
                "endpoint_name": "Churn-Endpoint",
                "baseline_data": "data/baseline.csv",
                "baseline_job_output_location": "baseline-bucket/output/",
                "data_capture_location": "capture-bucket/endpoint",
                "monitoring_output_location": "monitor-bucket/output",
                "schedule_expression": "cron(0 * ? * * *)",
                "monitor_max_runtime_seconds": 1800,
                "instance_type": "ml.m5.large",
                "instance_volume_size": 20,
            }),
            None,
        );
        let job_name = params.get("BaselineJobName").unwrap();
        assert!(job_name.starts_with("churn-endpoint-dataquality-"));
        assert_eq!(job_name.len(), "churn-endpoint-dataquality-".len() + 4);
        assert!(params.get("MonitoringScheduleName").unwrap().starts_with("churn-endpoint-dataquality-"));
        assert_eq!(
            params.get("BaselineJobOutputLocation").unwrap(),
            format!("baseline-bucket/output/{job_name}")
        );
        assert_eq!(params.get("BaselineOutputBucket"), Some("baseline-bucket"));
        assert_eq!(params.get("DataCaptureBucket"), Some("capture-bucket"));
        assert_eq!(params.get("MonitorMaxRuntimeSeconds"), Some("1800"));
        assert_eq!(params.get("InstanceVolumeSize"), Some("20"));
        assert_eq!(params.get("JobInstanceCount"), Some("1"));
        assert_eq!(params.get("BaselineMaxRuntimeSeconds"), Some(""));
        assert!(params.get("ImageUri").unwrap().ends_with("sagemaker-model-monitor-analyzer"));
        assert!(params.get("ProblemType").is_none());
    }

    #[test]
    fn test_monitor_locations_drop_trailing_slash() {
        let params = derive(
            json!({
                "pipeline_type": "byom_data_quality_monitor",
                "model_name": "churn",
                "endpoint_name": {"dev": "churn-dev", "staging": "churn-staging", "prod": "churn-prod"},
                "baseline_data": "data/baseline.csv",
                "baseline_job_output_location": "baseline-bucket/output",
                "data_capture_location": {"dev": "capture-bucket/dev/", "staging": "capture-bucket/staging/", "prod": "capture-bucket/prod/"},
                "monitoring_output_location": "monitor-bucket/output/",
                "schedule_expression": "cron(0 * ? * * *)",
                "monitor_max_runtime_seconds": 1800,
                "baseline_max_runtime_seconds": {"dev": 600, "staging": 900, "prod": 1200},
                "instance_type": "ml.m5.large",
                "instance_volume_size": 20,
            }),
            Some(Stage::Staging),
        );
        assert_eq!(params.get("DataCaptureLocation"), Some("capture-bucket/staging"));
        assert_eq!(params.get("DataCaptureBucket"), Some("capture-bucket"));
        assert_eq!(params.get("MonitoringOutputLocation"), Some("monitor-bucket/output"));
        assert_eq!(params.get("BaselineMaxRuntimeSeconds"), Some("900"));
        assert_eq!(params.get("EndpointName"), Some("churn-staging"));
    }

    #[test]
    fn test_model_bias_monitor_params() {
        let params = derive(
            json!({
                "pipeline_type": "byom_model_bias_monitor",
                "endpoint_name": "churn",
                "baseline_job_output_location": "baseline/output",
                "data_capture_location": "capture/endpoint",
                "monitor_ground_truth_input": "truth-bucket/labels",
                "problem_type": "BinaryClassification",
                "bias_config": {"label_values_or_threshold": [1], "facet_name": "Account Length"},
                "model_predicted_label_config": {"probability_threshold": 0.8},
                "features_attribute": "0",
            }),
            None,
        );
        assert_eq!(params.get("ProblemType"), Some("BinaryClassification"));
        assert_eq!(params.get("GroundTruthBucket"), Some("truth-bucket"));
        assert_eq!(params.get("FeaturesAttribute"), Some("0"));
        let bias: Value = serde_json::from_str(params.get("BiasConfig").unwrap()).unwrap();
        assert_eq!(bias["facet_name"], "Account Length");
        assert!(params.get("ImageUri").unwrap().ends_with("sagemaker-clarify-processing:1.0"));
        assert!(params.get("BaselineGroundTruthAttribute").is_none());
        assert!(params.get("SHAPConfig").is_none());
    }

    #[test]
    fn test_model_explainability_monitor_params() {
        let params = derive(
            json!({
                "pipeline_type": "byom_model_explainability_monitor",
                "endpoint_name": "churn",
                "problem_type": "Regression",
                "shap_config": {"baseline": "s3://bucket/baseline.csv", "num_samples": 500},
            }),
            None,
        );
        assert!(params.get("SHAPConfig").unwrap().contains("num_samples"));
        assert_eq!(params.get("ExplainabilityModelScores"), Some(""));
        assert!(params.get("GroundTruthBucket").is_none());
        assert!(params.get("BaselineJobName").unwrap().starts_with("churn-modelexplainability-"));
    }

    #[test]
    fn test_image_builder_params_skip_common_head() {
        let params = derive(
            json!({
                "pipeline_type": "byom_image_builder",
                "custom_algorithm_docker": "blueprints/custom.zip",
                "ecr_repo_name": "algorithms",
                "image_tag": "tree",
            }),
            None,
        );
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["NotificationsSNSTopicArn", "AssetsBucket", "CustomImage", "ECRRepoName", "ImageTag"]
        );
    }

    #[test]
    fn test_training_defaults_and_job_name() {
        let params = derive(
            json!({
                "pipeline_type": "model_tuner_builtin",
                "model_name": "Churn",
                "model_framework": "xgboost",
                "model_framework_version": "1",
                "training_data": "data/train.csv",
                "job_output_location": "output",
                "algo_hyperparamaters": {"eta": 0.2},
                "tuner_configs": {"max_jobs": 10},
                "hyperparamaters_ranges": {"eta": [0.1, 0.3]},
            }),
            None,
        );
        let job_name = params.get("JobName").unwrap();
        assert!(job_name.starts_with("churn-"));
        assert_eq!(job_name.len(), "churn-".len() + 8);
        assert_eq!(params.get("InstanceType"), Some("ml.m4.xlarge"));
        assert_eq!(params.get("UseSpotInstances"), Some("True"));
        assert_eq!(params.get("MaxWaitTimeForSpotInstances"), Some("172800"));
        assert_eq!(params.get("AlgoHyperparameteres"), Some(r#"{"eta":0.2}"#));
        assert_eq!(params.get("HyperparametersTunerConfig"), Some(r#"{"max_jobs":10}"#));
    }

    #[test]
    fn test_autopilot_params() {
        let params = derive(
            json!({
                "pipeline_type": "model_autopilot_training",
                "model_name": "churn",
                "job_name": "churn-autopilot",
                "training_data": "data/train.csv",
                "target_attribute": "Churn",
                "job_output_location": "output",
                "generate_definition_only": true,
            }),
            None,
        );
        assert_eq!(params.get("JobName"), Some("churn-autopilot"));
        assert_eq!(params.get("AutopilotMaxCandidates"), Some("10"));
        assert_eq!(params.get("GenerateDefinitionsOnly"), Some("True"));
        assert_eq!(params.get("AutopilotTotalRuntime"), Some("2592000"));
    }

    #[test]
    fn test_codepipeline_parameters_single_account() {
        let params = codepipeline_parameters(
            &config(),
            false,
            "mlops-pipeline-churn-byompipelinebatchbuiltin",
            "mlops_provisioned_pipelines/byom_batch_builtin/template.zip",
            "byom_batch_pipeline.yaml",
        );
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec![
                "NotificationsSNSTopicArn",
                "TemplateZipFileName",
                "TemplateFileName",
                "AssetsBucket",
                "StackName",
                "TemplateParamsName",
            ]
        );
        assert_eq!(params.get("TemplateParamsName"), Some("template_params.json"));
    }

    #[test]
    fn test_codepipeline_parameters_multi_account() {
        let mut config = config();
        config.accounts.staging.account_id = "222222222222".to_string();
        config.accounts.staging.org_id = "o-staging".to_string();
        config.delegated_admin = true;
        let params = codepipeline_parameters(&config, true, "stack", "zip", "file");
        assert!(params.get("TemplateParamsName").is_none());
        assert_eq!(params.get("StagingParamsName"), Some("staging_template_params.json"));
        assert_eq!(params.get("StagingAccountId"), Some("222222222222"));
        assert_eq!(params.get("StagingOrgId"), Some("o-staging"));
        assert_eq!(params.get("BlueprintBucket"), Some("blueprints"));
        assert_eq!(params.get("DelegatedAdminAccount"), Some("Yes"));
        assert_eq!(params.len(), 5 + 3 + 6 + 2);
    }

    #[test]
    fn test_format_template_parameters() {
        let params: ParameterList = [("AssetsBucket", "assets"), ("ModelName", "churn")].into_iter().collect();

        assert_eq!(
            format_template_parameters(&params, true),
            json!([
                {"ParameterKey": "AssetsBucket", "ParameterValue": "assets"},
                {"ParameterKey": "ModelName", "ParameterValue": "churn"},
            ])
        );
        assert_eq!(
            format_template_parameters(&params, false),
            json!({"Parameters": {"AssetsBucket": "assets", "ModelName": "churn"}})
        );
    }
}
