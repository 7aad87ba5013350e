//! Required request keys per pipeline type

use crate::error::{ParamsError, Result};
use crate::event::PipelineEvent;
use crate::pipeline::{MonitoringType, PipelineType, ProblemType};

const INFERENCE_COMMON_KEYS: &[&str] = &["pipeline_type", "model_name", "inference_instance"];
const BUILTIN_MODEL_KEYS: &[&str] = &["model_framework", "model_framework_version", "model_artifact_location"];
const CUSTOM_MODEL_KEYS: &[&str] = &["custom_image_uri", "model_artifact_location"];
const REGISTRY_MODEL_KEYS: &[&str] = &["model_package_name"];
const REALTIME_KEYS: &[&str] = &["data_capture_location"];
const BATCH_KEYS: &[&str] = &["batch_inference_data", "batch_job_output_location"];

const MONITOR_COMMON_KEYS: &[&str] = &[
    "pipeline_type",
    "model_name",
    "endpoint_name",
    "baseline_data",
    "baseline_job_output_location",
    "data_capture_location",
    "monitoring_output_location",
    "schedule_expression",
    "monitor_max_runtime_seconds",
    "instance_type",
    "instance_volume_size",
];

const IMAGE_BUILDER_KEYS: &[&str] = &["pipeline_type", "custom_algorithm_docker", "ecr_repo_name", "image_tag"];

const TRAINING_KEYS: &[&str] = &[
    "pipeline_type",
    "model_name",
    "model_framework",
    "model_framework_version",
    "training_data",
    "job_output_location",
    "algo_hyperparamaters",
];
const TUNER_KEYS: &[&str] = &["tuner_configs", "hyperparamaters_ranges"];

const AUTOPILOT_KEYS: &[&str] = &[
    "pipeline_type",
    "model_name",
    "training_data",
    "target_attribute",
    "job_output_location",
];

/// Keys a request must carry for `pipeline_type`, in a fixed order
///
/// `problem_type` only matters for the model-level monitors, which reject a
/// missing or unsupported one.
pub fn required_keys(
    pipeline_type: PipelineType,
    use_model_registry: bool,
    problem_type: Option<ProblemType>,
) -> Result<Vec<&'static str>> {
    let mut keys: Vec<&'static str> = Vec::new();

    match pipeline_type {
        PipelineType::ByomRealtimeBuiltin
        | PipelineType::ByomRealtimeCustom
        | PipelineType::ByomBatchBuiltin
        | PipelineType::ByomBatchCustom => {
            keys.extend(INFERENCE_COMMON_KEYS);
            let model_keys = if use_model_registry {
                REGISTRY_MODEL_KEYS
            } else if pipeline_type.uses_builtin_image() {
                BUILTIN_MODEL_KEYS
            } else {
                CUSTOM_MODEL_KEYS
            };
            keys.extend(model_keys);
            keys.extend(if pipeline_type.is_realtime() { REALTIME_KEYS } else { BATCH_KEYS });
        }
        PipelineType::ByomDataQualityMonitor => keys.extend(MONITOR_COMMON_KEYS),
        PipelineType::ByomModelQualityMonitor => {
            keys.extend(MONITOR_COMMON_KEYS);
            keys.extend(model_monitor_keys(pipeline_type, MonitoringType::ModelQuality, problem_type)?);
        }
        PipelineType::ByomModelBiasMonitor => {
            keys.extend(MONITOR_COMMON_KEYS);
            keys.extend(model_monitor_keys(pipeline_type, MonitoringType::ModelBias, problem_type)?);
        }
        PipelineType::ByomModelExplainabilityMonitor => {
            keys.extend(MONITOR_COMMON_KEYS);
            keys.extend(model_monitor_keys(
                pipeline_type,
                MonitoringType::ModelExplainability,
                problem_type,
            )?);
        }
        PipelineType::ByomImageBuilder => keys.extend(IMAGE_BUILDER_KEYS),
        PipelineType::ModelTrainingBuiltin => keys.extend(TRAINING_KEYS),
        PipelineType::ModelTunerBuiltin => {
            keys.extend(TRAINING_KEYS);
            keys.extend(TUNER_KEYS);
        }
        PipelineType::ModelAutopilotTraining => keys.extend(AUTOPILOT_KEYS),
    }
    Ok(keys)
}

fn model_monitor_keys(
    pipeline_type: PipelineType,
    monitoring_type: MonitoringType,
    problem_type: Option<ProblemType>,
) -> Result<Vec<&'static str>> {
    let problem_type = problem_type.ok_or_else(|| {
        ParamsError::bad_request(format!(
            "Bad request format. Unsupported problem_type in {} pipeline",
            pipeline_type
        ))
    })?;

    let mut keys = vec!["problem_type"];
    let mut baseline_keys = vec!["baseline_inference_attribute", "baseline_ground_truth_attribute"];
    match problem_type {
        ProblemType::Regression | ProblemType::MulticlassClassification => {
            keys.push("monitor_inference_attribute");
        }
        ProblemType::BinaryClassification => {
            keys.extend(["monitor_probability_attribute", "probability_threshold_attribute"]);
            baseline_keys.push("baseline_probability_attribute");
        }
    }

    match monitoring_type {
        MonitoringType::ModelQuality => {
            keys.extend(baseline_keys);
            keys.push("monitor_ground_truth_input");
        }
        MonitoringType::ModelBias => keys.extend(["monitor_ground_truth_input", "bias_config"]),
        MonitoringType::ModelExplainability => keys.push("shap_config"),
        MonitoringType::DataQuality => {}
    }
    Ok(keys)
}

/// Check that `event` carries every key its pipeline type requires
///
/// Returns the parsed pipeline type; the first missing key is reported.
pub fn validate(event: &PipelineEvent, use_model_registry: bool) -> Result<PipelineType> {
    let pipeline_type: PipelineType = event.pipeline_type_raw().parse()?;
    let problem_type = ProblemType::parse(&event.string("problem_type"));

    for key in required_keys(pipeline_type, use_model_registry, problem_type)? {
        if !event.contains(key) {
            log::error!("Request event did not have parameter: {}", key);
            return Err(ParamsError::bad_request(format!(
                "Bad request. API body does not have the necessary parameter: {}",
                key
            )));
        }
    }

    log::debug!("validate: {} request is complete", pipeline_type);
    Ok(pipeline_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn event_with(keys: &[&str], pipeline_type: &str) -> PipelineEvent {
        let mut e = PipelineEvent::default();
        for key in keys {
            e.insert(*key, "value");
        }
        e.insert("pipeline_type", pipeline_type);
        e
    }

    #[test]
    fn test_realtime_builtin_keys() {
        let keys = required_keys(PipelineType::ByomRealtimeBuiltin, false, None).unwrap();
        assert_eq!(
            keys,
            vec![
                "pipeline_type",
                "model_name",
                "inference_instance",
                "model_framework",
                "model_framework_version",
                "model_artifact_location",
                "data_capture_location",
            ]
        );
    }

    #[test]
    fn test_batch_custom_keys() {
        let keys = required_keys(PipelineType::ByomBatchCustom, false, None).unwrap();
        assert!(keys.contains(&"custom_image_uri"));
        assert!(keys.contains(&"batch_inference_data"));
        assert!(keys.contains(&"batch_job_output_location"));
        assert!(!keys.contains(&"data_capture_location"));
    }

    #[test]
    fn test_model_registry_replaces_model_keys() {
        let keys = required_keys(PipelineType::ByomRealtimeBuiltin, true, None).unwrap();
        assert!(keys.contains(&"model_package_name"));
        assert!(!keys.contains(&"model_framework"));
        assert!(!keys.contains(&"model_artifact_location"));

        let keys = required_keys(PipelineType::ByomBatchCustom, true, None).unwrap();
        assert!(!keys.contains(&"custom_image_uri"));
    }

    #[test]
    fn test_data_quality_ignores_problem_type() {
        let keys = required_keys(PipelineType::ByomDataQualityMonitor, false, None).unwrap();
        assert_eq!(keys, MONITOR_COMMON_KEYS.to_vec());
    }

    #[test]
    fn test_model_quality_binary_classification_keys() {
        let keys = required_keys(
            PipelineType::ByomModelQualityMonitor,
            false,
            Some(ProblemType::BinaryClassification),
        )
        .unwrap();
        for key in [
            "problem_type",
            "monitor_probability_attribute",
            "probability_threshold_attribute",
            "baseline_probability_attribute",
            "baseline_ground_truth_attribute",
            "monitor_ground_truth_input",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert!(!keys.contains(&"monitor_inference_attribute"));
    }

    #[test]
    fn test_bias_and_explainability_keys() {
        let bias = required_keys(PipelineType::ByomModelBiasMonitor, false, Some(ProblemType::Regression)).unwrap();
        assert!(bias.contains(&"bias_config"));
        assert!(bias.contains(&"monitor_ground_truth_input"));
        assert!(bias.contains(&"monitor_inference_attribute"));
        assert!(!bias.contains(&"baseline_ground_truth_attribute"));

        let shap = required_keys(
            PipelineType::ByomModelExplainabilityMonitor,
            false,
            Some(ProblemType::MulticlassClassification),
        )
        .unwrap();
        assert!(shap.contains(&"shap_config"));
        assert!(!shap.contains(&"monitor_ground_truth_input"));
    }

    #[test]
    fn test_model_monitor_without_problem_type_is_bad_request() {
        let err = required_keys(PipelineType::ByomModelBiasMonitor, false, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request format. Unsupported problem_type in byom_model_bias_monitor pipeline"
        );
    }

    #[test]
    fn test_training_keys() {
        let training = required_keys(PipelineType::ModelTrainingBuiltin, false, None).unwrap();
        let tuner = required_keys(PipelineType::ModelTunerBuiltin, false, None).unwrap();
        assert_eq!(&tuner[..training.len()], &training[..]);
        assert!(tuner.ends_with(&["tuner_configs", "hyperparamaters_ranges"]));

        let autopilot = required_keys(PipelineType::ModelAutopilotTraining, false, None).unwrap();
        assert!(autopilot.contains(&"target_attribute"));
        assert!(!autopilot.contains(&"model_framework"));
    }

    #[test]
    fn test_keys_are_deterministic() {
        for p in PipelineType::ALL {
            let first = required_keys(p, false, Some(ProblemType::Regression)).unwrap();
            let second = required_keys(p, false, Some(ProblemType::Regression)).unwrap();
            assert_eq!(first, second);
            assert_eq!(first[0], "pipeline_type");
        }
    }

    #[test]
    fn test_validate_accepts_complete_event_with_extras() {
        let keys = required_keys(PipelineType::ByomImageBuilder, false, None).unwrap();
        let mut e = event_with(&keys, "byom_image_builder");
        e.insert("unrelated", json!({"nested": true}));
        assert_eq!(validate(&e, false).unwrap(), PipelineType::ByomImageBuilder);
    }

    #[test]
    fn test_validate_reports_missing_key() {
        let keys = required_keys(PipelineType::ByomBatchBuiltin, false, None).unwrap();
        for missing in keys.iter().skip(1) {
            let mut e = event_with(&keys, "byom_batch_builtin");
            e.remove(missing);
            let err = validate(&e, false).unwrap_err();
            assert!(err.is_bad_request());
            assert_eq!(
                err.to_string(),
                format!("Bad request. API body does not have the necessary parameter: {missing}")
            );
        }
    }

    #[test]
    fn test_validate_uses_event_problem_type() {
        let keys = required_keys(
            PipelineType::ByomModelQualityMonitor,
            false,
            Some(ProblemType::Regression),
        )
        .unwrap();
        let mut e = event_with(&keys, "byom_model_quality_monitor");
        e.insert("problem_type", Value::from("Regression"));
        assert!(validate(&e, false).is_ok());

        e.insert("problem_type", Value::from("Clustering"));
        assert!(validate(&e, false).unwrap_err().is_bad_request());
    }

    #[test]
    fn test_validate_unknown_pipeline_type() {
        let e = event_with(&[], "byom_model_monitor");
        assert!(validate(&e, false).unwrap_err().is_bad_request());
    }
}
