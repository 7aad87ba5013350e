//! PipelineOrchestrator - provisions MLOps pipelines on request
//!
//! The Lambda behind the `/provisionpipeline` and `/pipelinestatus` API routes.
//!
//! # Flow
//!
//! ```text
//! event ──route──▶ validate ──▶ parameters ──▶ template.zip (S3)
//!                                                    │
//!                                                    ▼
//!              response ◀── create/update codepipeline stack (CloudFormation)
//! ```
//!
//! AWS access goes through the [`ArtifactStore`], [`StackClient`] and
//! [`PipelineStateClient`] traits.

pub mod aws;
pub mod error;
pub mod handler;
mod provision;
pub mod response;
mod status;

pub use aws::{
    ArtifactStore, CloudFormationStacks, CodePipelineStates, PipelineState, PipelineStateClient, S3ArtifactStore,
    StackClient, StackRequest, StackResource,
};
pub use error::{OrchestratorError, Result};
pub use handler::Orchestrator;
pub use provision::StackOutcome;
pub use response::ApiResponse;
