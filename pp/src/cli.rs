//! CLI argument parsing for pipelineparams

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pp")]
#[command(author, version, about = "Validate MLOps pipeline requests and derive their template parameters", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a request payload and list the keys its pipeline type requires
    Validate {
        /// Request payload (JSON file)
        #[arg(required = true)]
        event: PathBuf,
    },

    /// Print the template parameters derived from a request payload
    Params {
        /// Request payload (JSON file)
        #[arg(required = true)]
        event: PathBuf,

        /// Read the entry for this stage from multi-account fields (dev|staging|prod)
        #[arg(short, long)]
        stage: Option<String>,

        /// Print StackSet-style parameters instead of CloudFormation-action style
        #[arg(short, long)]
        multi_account: bool,
    },

    /// Print the name of the stack that would provision the request
    StackName {
        /// Request payload (JSON file)
        #[arg(required = true)]
        event: PathBuf,
    },

    /// Print the template location for a pipeline type or codepipeline template
    TemplateUrl {
        /// Pipeline type, single_account_codepipeline or multi_account_codepipeline
        #[arg(required = true)]
        name: String,
    },

    /// Build the template archive for a request locally
    Package {
        /// Request payload (JSON file)
        #[arg(required = true)]
        event: PathBuf,

        /// Blueprint template to package
        #[arg(short, long)]
        template: PathBuf,

        /// Where to write the archive
        #[arg(short, long)]
        output: PathBuf,

        /// Write per-stage parameter files
        #[arg(short, long)]
        multi_account: bool,
    },
}
