//! PipelineParams - request validation and parameter derivation for MLOps pipelines
//!
//! A provisioning request names a pipeline blueprint and carries the values
//! its CloudFormation template needs. This crate checks the request, derives
//! the ordered parameter list, names the stack and packages the template
//! archive that the deployment pipeline consumes.
//!
//! # Flow
//!
//! ```text
//! PipelineEvent ──validate──▶ PipelineType
//!       │                          │
//!       └────template_parameters───┴──▶ ParameterList ──▶ params files ──▶ template.zip
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pipelineparams::{Config, ImageRegistry, PipelineEvent, template_parameters, validate};
//!
//! let config = Config::from_env();
//! let event = PipelineEvent::from_json(body)?;
//! let pipeline_type = validate(&event, config.use_model_registry)?;
//! let params = template_parameters(&event, pipeline_type, &config, &ImageRegistry::from_config(&config), None)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod images;
pub mod naming;
pub mod packaging;
pub mod params;
pub mod pipeline;
pub mod required;

pub use config::Config;
pub use error::{ParamsError, Result};
pub use event::PipelineEvent;
pub use images::ImageRegistry;
pub use naming::{clean_param, stack_name, template_url};
pub use packaging::{ParamsFile, package_template, params_files, template_zip_name};
pub use params::{ParameterList, codepipeline_parameters, format_template_parameters, template_parameters};
pub use pipeline::{MonitoringType, PipelineType, ProblemType, Stage};
pub use required::{required_keys, validate};
