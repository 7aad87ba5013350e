//! Pipeline type taxonomy
//!
//! Every request names one of the blueprints below through its `pipeline_type`
//! field. The enum drives required-key lookup, parameter derivation, template
//! selection and stack naming.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParamsError;

/// Supported pipeline blueprints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineType {
    ByomRealtimeBuiltin,
    ByomRealtimeCustom,
    ByomBatchBuiltin,
    ByomBatchCustom,
    ByomDataQualityMonitor,
    ByomModelQualityMonitor,
    ByomModelBiasMonitor,
    ByomModelExplainabilityMonitor,
    ByomImageBuilder,
    ModelTrainingBuiltin,
    ModelTunerBuiltin,
    ModelAutopilotTraining,
}

impl PipelineType {
    pub const ALL: [PipelineType; 12] = [
        PipelineType::ByomRealtimeBuiltin,
        PipelineType::ByomRealtimeCustom,
        PipelineType::ByomBatchBuiltin,
        PipelineType::ByomBatchCustom,
        PipelineType::ByomDataQualityMonitor,
        PipelineType::ByomModelQualityMonitor,
        PipelineType::ByomModelBiasMonitor,
        PipelineType::ByomModelExplainabilityMonitor,
        PipelineType::ByomImageBuilder,
        PipelineType::ModelTrainingBuiltin,
        PipelineType::ModelTunerBuiltin,
        PipelineType::ModelAutopilotTraining,
    ];

    /// Wire name used in request payloads and template lookups
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByomRealtimeBuiltin => "byom_realtime_builtin",
            Self::ByomRealtimeCustom => "byom_realtime_custom",
            Self::ByomBatchBuiltin => "byom_batch_builtin",
            Self::ByomBatchCustom => "byom_batch_custom",
            Self::ByomDataQualityMonitor => "byom_data_quality_monitor",
            Self::ByomModelQualityMonitor => "byom_model_quality_monitor",
            Self::ByomModelBiasMonitor => "byom_model_bias_monitor",
            Self::ByomModelExplainabilityMonitor => "byom_model_explainability_monitor",
            Self::ByomImageBuilder => "byom_image_builder",
            Self::ModelTrainingBuiltin => "model_training_builtin",
            Self::ModelTunerBuiltin => "model_tuner_builtin",
            Self::ModelAutopilotTraining => "model_autopilot_training",
        }
    }

    pub fn is_realtime(&self) -> bool {
        matches!(self, Self::ByomRealtimeBuiltin | Self::ByomRealtimeCustom)
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Self::ByomBatchBuiltin | Self::ByomBatchCustom)
    }

    /// Realtime or batch inference (the BYOM deployment pipelines)
    pub fn is_inference(&self) -> bool {
        self.is_realtime() || self.is_batch()
    }

    /// Built-in algorithm container, resolved from framework + version
    pub fn uses_builtin_image(&self) -> bool {
        matches!(
            self,
            Self::ByomRealtimeBuiltin | Self::ByomBatchBuiltin | Self::ModelTrainingBuiltin | Self::ModelTunerBuiltin
        )
    }

    pub fn is_monitor(&self) -> bool {
        self.monitoring_type().is_some()
    }

    pub fn monitoring_type(&self) -> Option<MonitoringType> {
        match self {
            Self::ByomDataQualityMonitor => Some(MonitoringType::DataQuality),
            Self::ByomModelQualityMonitor => Some(MonitoringType::ModelQuality),
            Self::ByomModelBiasMonitor => Some(MonitoringType::ModelBias),
            Self::ByomModelExplainabilityMonitor => Some(MonitoringType::ModelExplainability),
            _ => None,
        }
    }

    /// Training, tuning or autopilot jobs
    pub fn is_training(&self) -> bool {
        matches!(
            self,
            Self::ModelTrainingBuiltin | Self::ModelTunerBuiltin | Self::ModelAutopilotTraining
        )
    }

    /// Pipelines that can be promoted across dev/staging/prod accounts
    pub fn supports_multi_account(&self) -> bool {
        self.is_inference() || self.is_monitor()
    }

    /// Pipelines deployed through a CodePipeline stack (everything but the image builder)
    pub fn deploys_through_codepipeline(&self) -> bool {
        self.supports_multi_account() || self.is_training()
    }
}

impl fmt::Display for PipelineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PipelineType {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PipelineType::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                ParamsError::bad_request(
                    "Bad request format. Pipeline type not supported. Check documentation for API & config formats",
                )
            })
    }
}

/// SageMaker Model Monitor flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonitoringType {
    DataQuality,
    ModelQuality,
    ModelBias,
    ModelExplainability,
}

impl MonitoringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataQuality => "DataQuality",
            Self::ModelQuality => "ModelQuality",
            Self::ModelBias => "ModelBias",
            Self::ModelExplainability => "ModelExplainability",
        }
    }

    /// Monitors that compare predictions against a model-level baseline
    pub fn is_model_level(&self) -> bool {
        !matches!(self, Self::DataQuality)
    }

    /// Monitors that consume ground-truth labels
    pub fn needs_ground_truth(&self) -> bool {
        matches!(self, Self::ModelQuality | Self::ModelBias)
    }

    /// Monitors that run on the SageMaker Clarify container
    pub fn uses_clarify(&self) -> bool {
        matches!(self, Self::ModelBias | Self::ModelExplainability)
    }
}

impl fmt::Display for MonitoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// ML problem types accepted by the model-level monitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemType {
    Regression,
    BinaryClassification,
    MulticlassClassification,
}

impl ProblemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regression => "Regression",
            Self::BinaryClassification => "BinaryClassification",
            Self::MulticlassClassification => "MulticlassClassification",
        }
    }

    /// Parse the exact (case-sensitive) name; unknown names yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Regression" => Some(Self::Regression),
            "BinaryClassification" => Some(Self::BinaryClassification),
            "MulticlassClassification" => Some(Self::MulticlassClassification),
            _ => None,
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deployment stage in a multi-account setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Dev,
    Staging,
    Prod,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Dev, Stage::Staging, Stage::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    /// Name of the parameters file this stage reads inside the template archive
    pub fn params_file_name(&self) -> String {
        format!("{}_template_params.json", self.as_str())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" => Ok(Self::Prod),
            other => Err(ParamsError::bad_request(format!(
                "Bad request. Stage '{}' is not one of dev|staging|prod",
                other
            ))),
        }
    }
}
