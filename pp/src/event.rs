//! Pipeline request payload
//!
//! The payload is a flat JSON object whose fields depend on `pipeline_type`.
//! Multi-account fields may hold a stage map instead of a scalar:
//!
//! ```text
//! "inference_instance": {"dev": "ml.t2.large", "staging": "ml.m5.large", "prod": "ml.m5.4xlarge"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ParamsError, Result};
use crate::pipeline::Stage;

/// A pipeline provisioning request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineEvent {
    fields: Map<String, Value>,
}

impl PipelineEvent {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a decoded JSON value; anything but an object is a bad request
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ParamsError::bad_request(format!(
                "Bad request format. Expected a JSON object, received: {}",
                other
            ))),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Raw `pipeline_type` as sent, empty when absent
    pub fn pipeline_type_raw(&self) -> String {
        self.string("pipeline_type")
    }

    /// Field rendered as a parameter string, or `default` when absent/null
    pub fn str_or(&self, key: &str, default: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => default.to_string(),
            Some(value) => scalar_string(value),
        }
    }

    /// Field rendered as a parameter string, empty when absent
    pub fn string(&self, key: &str) -> String {
        self.str_or(key, "")
    }

    /// Stage-aware lookup: a stage map yields the entry for `stage`,
    /// anything else is returned whole
    pub fn stage_param(&self, key: &str, stage: Option<Stage>) -> String {
        match (self.fields.get(key), stage) {
            (Some(Value::Object(by_stage)), Some(stage)) if by_stage.contains_key(stage.as_str()) => {
                by_stage.get(stage.as_str()).map(scalar_string).unwrap_or_default()
            }
            (None | Some(Value::Null), _) => String::new(),
            (Some(value), _) => scalar_string(value),
        }
    }

    /// JSON-valued configuration (bias config, tuner config, ...) rendered
    /// for a CloudFormation string parameter; empty when absent
    pub fn json_param(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(value) => value.to_string(),
        }
    }
}

impl From<Map<String, Value>> for PipelineEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
