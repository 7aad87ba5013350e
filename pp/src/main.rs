use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

use pipelineparams::cli::{Cli, Command};
use pipelineparams::config::Config;
use pipelineparams::naming::template_file_name;
use pipelineparams::packaging::to_pretty_json;
use pipelineparams::{
    ImageRegistry, PipelineEvent, PipelineType, ProblemType, Stage, format_template_parameters, package_template,
    params_files, required_keys, stack_name, template_parameters, template_url, validate,
};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn read_event(path: &Path) -> Result<PipelineEvent> {
    let text = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    PipelineEvent::from_json(&text).context(format!("Failed to parse {}", path.display()))
}

/// Read and validate a payload, printing the BadRequest message on rejection
fn load_validated(path: &Path, config: &Config) -> Result<(PipelineEvent, PipelineType)> {
    let event = read_event(path)?;
    match validate(&event, config.use_model_registry) {
        Ok(pipeline_type) => Ok((event, pipeline_type)),
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("pipelineparams starting");

    match cli.command {
        Command::Validate { event } => {
            let (event, pipeline_type) = load_validated(&event, &config)?;
            let problem_type = ProblemType::parse(&event.string("problem_type"));
            let keys = required_keys(pipeline_type, config.use_model_registry, problem_type)?;
            println!("{} Valid {} request", "✓".green(), pipeline_type.to_string().cyan());
            for key in keys {
                println!("  {}", key);
            }
        }
        Command::Params {
            event,
            stage,
            multi_account,
        } => {
            let (event, pipeline_type) = load_validated(&event, &config)?;
            let stage = stage.map(|s| s.parse::<Stage>()).transpose()?;
            let images = ImageRegistry::from_config(&config);
            let params = template_parameters(&event, pipeline_type, &config, &images, stage)?;
            let formatted = format_template_parameters(&params, multi_account);
            println!("{}", String::from_utf8(to_pretty_json(&formatted)?)?);
        }
        Command::StackName { event } => {
            let (event, pipeline_type) = load_validated(&event, &config)?;
            println!("{}", stack_name(&event, pipeline_type, &config.pipeline_stack_name));
        }
        Command::TemplateUrl { name } => match template_url(&name, &config.blueprint_bucket_url) {
            Ok(url) => println!("{}", url),
            Err(e) => {
                eprintln!("{} {}", "✗".red(), e);
                std::process::exit(1);
            }
        },
        Command::Package {
            event,
            template,
            output,
            multi_account,
        } => {
            let (event, pipeline_type) = load_validated(&event, &config)?;
            let template_body = fs::read(&template).context(format!("Failed to read {}", template.display()))?;
            let file_name = template
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| template_file_name(&template.to_string_lossy()).to_string());

            let images = ImageRegistry::from_config(&config);
            let files = params_files(&event, pipeline_type, &config, &images, multi_account)?;
            let archive = package_template(&file_name, &template_body, &files)?;
            fs::write(&output, &archive).context(format!("Failed to write {}", output.display()))?;

            println!(
                "{} Packaged {} ({} parameter file(s)) into {}",
                "✓".green(),
                file_name.cyan(),
                files.len(),
                output.display()
            );
        }
    }

    Ok(())
}
