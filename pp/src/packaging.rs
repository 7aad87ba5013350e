//! Template archive packaging
//!
//! The codepipeline stack reads one archive from the assets bucket holding
//! the blueprint template and its parameter file(s):
//!
//! ```text
//! template.zip
//! ├── byom_batch_pipeline.yaml
//! └── template_params.json            (single account)
//!     or dev_/staging_/prod_template_params.json (multi account)
//! ```

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::config::Config;
use crate::error::Result;
use crate::event::PipelineEvent;
use crate::images::ImageRegistry;
use crate::params::{format_template_parameters, template_parameters};
use crate::pipeline::{PipelineType, Stage};

/// Parameter file read by single-account deployments
pub const TEMPLATE_PARAMS_FILE: &str = "template_params.json";

/// Assets-bucket key of the archive for `pipeline_type`
pub fn template_zip_name(pipeline_type: PipelineType) -> String {
    format!("mlops_provisioned_pipelines/{}/template.zip", pipeline_type)
}

/// A parameter file to place next to the template
#[derive(Debug, Clone, PartialEq)]
pub struct ParamsFile {
    pub name: String,
    pub contents: Value,
}

/// Parameter files for a deployment: one per stage in multi-account mode,
/// a single `template_params.json` otherwise
pub fn params_files(
    event: &PipelineEvent,
    pipeline_type: PipelineType,
    config: &Config,
    images: &ImageRegistry,
    multi_account: bool,
) -> Result<Vec<ParamsFile>> {
    if !multi_account {
        let params = template_parameters(event, pipeline_type, config, images, None)?;
        return Ok(vec![ParamsFile {
            name: TEMPLATE_PARAMS_FILE.to_string(),
            contents: format_template_parameters(&params, false),
        }]);
    }

    Stage::ALL
        .into_iter()
        .map(|stage| {
            let params = template_parameters(event, pipeline_type, config, images, Some(stage))?;
            Ok(ParamsFile {
                name: stage.params_file_name(),
                contents: format_template_parameters(&params, true),
            })
        })
        .collect()
}

/// JSON with four-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Build the template archive in memory
///
/// Files are staged in a scratch directory first so the archive mirrors
/// what a deployment would unpack.
pub fn package_template(template_file_name: &str, template_body: &[u8], files: &[ParamsFile]) -> Result<Vec<u8>> {
    let staging = TempDir::new()?;
    log::debug!("package_template: staging in {}", staging.path().display());

    fs::write(staging.path().join(template_file_name), template_body)?;
    for file in files {
        fs::write(staging.path().join(&file.name), to_pretty_json(&file.contents)?)?;
    }

    zip_directory(staging.path())
}

/// Zip every file under `dir`, named relative to it
pub fn zip_directory(dir: &Path) -> Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).map_err(io::Error::other)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        writer.start_file(name, options)?;
        writer.write_all(&fs::read(entry.path())?)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use zip::ZipArchive;

    fn archive_names(bytes: Vec<u8>) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    fn batch_event() -> PipelineEvent {
        PipelineEvent::from_value(json!({
            "pipeline_type": "byom_batch_custom",
            "model_name": "churn",
            "custom_image_uri": "image:latest",
            "model_artifact_location": "models/churn.tar.gz",
            "inference_instance": {"dev": "ml.m5.large", "staging": "ml.m5.xlarge", "prod": "ml.m5.4xlarge"},
            "batch_inference_data": "bucket/input.csv",
            "batch_job_output_location": "bucket/output",
        }))
        .unwrap()
    }

    #[test]
    fn test_template_zip_name() {
        assert_eq!(
            template_zip_name(PipelineType::ByomRealtimeCustom),
            "mlops_provisioned_pipelines/byom_realtime_custom/template.zip"
        );
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let text = String::from_utf8(to_pretty_json(&json!({"Parameters": {"A": "b"}})).unwrap()).unwrap();
        assert_eq!(text, "{\n    \"Parameters\": {\n        \"A\": \"b\"\n    }\n}");
    }

    #[test]
    fn test_single_account_params_file() {
        let files = params_files(
            &batch_event(),
            PipelineType::ByomBatchCustom,
            &Config::default(),
            &ImageRegistry::default(),
            false,
        )
        .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "template_params.json");
        assert!(files[0].contents["Parameters"]["InferenceInstance"].is_string());
    }

    #[test]
    fn test_multi_account_params_files_per_stage() {
        let files = params_files(
            &batch_event(),
            PipelineType::ByomBatchCustom,
            &Config::default(),
            &ImageRegistry::default(),
            true,
        )
        .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["dev_template_params.json", "staging_template_params.json", "prod_template_params.json"]
        );

        let prod = files[2].contents.as_array().unwrap();
        let instance = prod
            .iter()
            .find(|p| p["ParameterKey"] == "InferenceInstance")
            .unwrap();
        assert_eq!(instance["ParameterValue"], "ml.m5.4xlarge");
    }

    #[test]
    fn test_package_template_multi_account() {
        let files = params_files(
            &batch_event(),
            PipelineType::ByomBatchCustom,
            &Config::default(),
            &ImageRegistry::default(),
            true,
        )
        .unwrap();
        let bytes = package_template("byom_batch_pipeline.yaml", b"Resources: {}\n", &files).unwrap();
        assert_eq!(
            archive_names(bytes),
            vec![
                "byom_batch_pipeline.yaml",
                "dev_template_params.json",
                "prod_template_params.json",
                "staging_template_params.json",
            ]
        );
    }

    #[test]
    fn test_package_template_contents() {
        let files = vec![ParamsFile {
            name: TEMPLATE_PARAMS_FILE.to_string(),
            contents: json!({"Parameters": {"ModelName": "churn"}}),
        }];
        let bytes = package_template("template.yaml", b"Resources: {}\n", &files).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        archive
            .by_name("template_params.json")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Parameters"]["ModelName"], "churn");
        assert!(text.contains("\n    \"Parameters\""));

        let mut template = String::new();
        archive.by_name("template.yaml").unwrap().read_to_string(&mut template).unwrap();
        assert_eq!(template, "Resources: {}\n");
    }

    #[test]
    fn test_zip_directory_nested_paths() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let names = archive_names(zip_directory(dir.path()).unwrap());
        assert_eq!(names, vec!["b.txt", "nested/a.txt"]);
    }
}
