//! Orchestrator configuration
//!
//! The Lambda reads its settings from environment variables; the `pp` CLI
//! reads the same settings from a YAML file so payloads can be checked offline.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::Stage;

/// Settings shared by validation, parameter derivation and provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Regional domain name of the blueprint bucket (no scheme)
    #[serde(rename = "blueprint-bucket-url")]
    pub blueprint_bucket_url: String,

    /// Bucket holding the blueprint templates
    #[serde(rename = "blueprint-bucket")]
    pub blueprint_bucket: String,

    /// Bucket receiving template archives and pipeline assets
    #[serde(rename = "assets-bucket")]
    pub assets_bucket: String,

    /// Prefix for every provisioned stack name
    #[serde(rename = "pipeline-stack-name")]
    pub pipeline_stack_name: String,

    pub region: String,

    /// Role CloudFormation assumes when creating pipeline stacks
    #[serde(rename = "cfn-role-arn")]
    pub cfn_role_arn: String,

    /// ECR repository holding custom algorithm images
    #[serde(rename = "ecr-repo-arn")]
    pub ecr_repo_arn: String,

    #[serde(rename = "notifications-sns-topic")]
    pub notifications_sns_topic: String,

    /// Models come from the SageMaker Model Registry instead of artifacts
    #[serde(rename = "use-model-registry")]
    pub use_model_registry: bool,

    /// Deploy through StackSets into dev/staging/prod accounts
    #[serde(rename = "multi-account")]
    pub multi_account: bool,

    /// Deploy StackSets as a delegated administrator account
    #[serde(rename = "delegated-admin")]
    pub delegated_admin: bool,

    /// Include the underlying error text in API error responses
    #[serde(rename = "allow-detailed-error-message")]
    pub allow_detailed_error_message: bool,

    /// Target accounts for multi-account deployments
    pub accounts: AccountsConfig,

    /// Extra or overriding ECR registry accounts: image family -> region -> account id
    #[serde(rename = "image-accounts")]
    pub image_accounts: BTreeMap<String, BTreeMap<String, String>>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blueprint_bucket_url: String::new(),
            blueprint_bucket: String::new(),
            assets_bucket: String::new(),
            pipeline_stack_name: "mlops-pipeline".to_string(),
            region: "us-east-1".to_string(),
            cfn_role_arn: String::new(),
            ecr_repo_arn: String::new(),
            notifications_sns_topic: String::new(),
            use_model_registry: false,
            multi_account: false,
            delegated_admin: false,
            allow_detailed_error_message: true,
            accounts: AccountsConfig::default(),
            image_accounts: BTreeMap::new(),
            log_level: None,
        }
    }
}

/// Account and organization ids per stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub dev: StageAccount,
    pub staging: StageAccount,
    pub prod: StageAccount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageAccount {
    #[serde(rename = "account-id")]
    pub account_id: String,

    #[serde(rename = "org-id")]
    pub org_id: String,
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup; unset variables
    /// keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let text = |key: &str, target: &mut String| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        text("BLUEPRINT_BUCKET_URL", &mut config.blueprint_bucket_url);
        text("BLUEPRINT_BUCKET", &mut config.blueprint_bucket);
        text("ASSETS_BUCKET", &mut config.assets_bucket);
        text("PIPELINE_STACK_NAME", &mut config.pipeline_stack_name);
        text("REGION", &mut config.region);
        text("CFN_ROLE_ARN", &mut config.cfn_role_arn);
        text("ECR_REPO_ARN", &mut config.ecr_repo_arn);
        text("MLOPS_NOTIFICATIONS_SNS_TOPIC", &mut config.notifications_sns_topic);
        text("DEV_ACCOUNT_ID", &mut config.accounts.dev.account_id);
        text("DEV_ORG_ID", &mut config.accounts.dev.org_id);
        text("STAGING_ACCOUNT_ID", &mut config.accounts.staging.account_id);
        text("STAGING_ORG_ID", &mut config.accounts.staging.org_id);
        text("PROD_ACCOUNT_ID", &mut config.accounts.prod.account_id);
        text("PROD_ORG_ID", &mut config.accounts.prod.org_id);

        if let Some(value) = lookup("USE_MODEL_REGISTRY") {
            config.use_model_registry = parse_flag(&value);
        }
        if let Some(value) = lookup("IS_MULTI_ACCOUNT") {
            config.multi_account = parse_flag(&value);
        }
        if let Some(value) = lookup("IS_DELEGATED_ADMIN") {
            config.delegated_admin = parse_flag(&value);
        }
        if let Some(value) = lookup("ALLOW_DETAILED_ERROR_MESSAGE") {
            config.allow_detailed_error_message = parse_flag(&value);
        }
        config.log_level = lookup("LOG_LEVEL");

        config
    }

    /// Check that the settings a provisioning request needs are present
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        let mut required = vec![
            ("BLUEPRINT_BUCKET_URL", &self.blueprint_bucket_url),
            ("BLUEPRINT_BUCKET", &self.blueprint_bucket),
            ("ASSETS_BUCKET", &self.assets_bucket),
            ("PIPELINE_STACK_NAME", &self.pipeline_stack_name),
            ("REGION", &self.region),
            ("CFN_ROLE_ARN", &self.cfn_role_arn),
        ];
        if self.multi_account {
            required.extend([
                ("DEV_ACCOUNT_ID", &self.accounts.dev.account_id),
                ("DEV_ORG_ID", &self.accounts.dev.org_id),
                ("STAGING_ACCOUNT_ID", &self.accounts.staging.account_id),
                ("STAGING_ORG_ID", &self.accounts.staging.org_id),
                ("PROD_ACCOUNT_ID", &self.accounts.prod.account_id),
                ("PROD_ORG_ID", &self.accounts.prod.org_id),
            ]);
        }

        let missing: Vec<&str> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();

        if !missing.is_empty() {
            return Err(eyre::eyre!("Missing required settings: {}", missing.join(", ")));
        }
        Ok(())
    }

    pub fn stage_account(&self, stage: Stage) -> &StageAccount {
        match stage {
            Stage::Dev => &self.accounts.dev,
            Stage::Staging => &self.accounts.staging,
            Stage::Prod => &self.accounts.prod,
        }
    }

    /// Load config from file with fallback chain, or use defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let default_paths = [
            Some(PathBuf::from("pipelineparams.yml")),
            dirs::config_dir().map(|p| p.join("pipelineparams").join("pipelineparams.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Deployment flags arrive as "Yes"/"No" or "True"/"False"
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "yes" | "true")
}
