//! Built-in SageMaker container image lookup
//!
//! Images live in per-region ECR registries owned by AWS. The registry
//! accounts below cover the commercial, China and GovCloud regions the
//! containers ship in; deployments in newer regions add entries through the
//! `image-accounts` config map.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::{ParamsError, Result};

/// ECR registry families, each with its own account per region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFamily {
    Xgboost,
    Algorithms,
    ModelMonitor,
    Clarify,
}

impl ImageFamily {
    /// Key used in the `image-accounts` override map
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xgboost => "xgboost",
            Self::Algorithms => "algorithms",
            Self::ModelMonitor => "model-monitor",
            Self::Clarify => "clarify",
        }
    }

    fn builtin_accounts(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Xgboost => XGBOOST_ACCOUNTS,
            Self::Algorithms => ALGORITHM_ACCOUNTS,
            Self::ModelMonitor => MODEL_MONITOR_ACCOUNTS,
            Self::Clarify => CLARIFY_ACCOUNTS,
        }
    }
}

/// First-party SageMaker algorithms served from the shared algorithm registry
const FIRST_PARTY_ALGORITHMS: &[&str] = &[
    "blazingtext",
    "factorization-machines",
    "forecasting-deepar",
    "image-classification",
    "ipinsights",
    "kmeans",
    "knn",
    "lda",
    "linear-learner",
    "ntm",
    "object-detection",
    "object2vec",
    "pca",
    "randomcutforest",
    "semantic-segmentation",
    "seq2seq",
];

const XGBOOST_ACCOUNTS: &[(&str, &str)] = &[
    ("ap-east-1", "651117190479"),
    ("ap-northeast-1", "354813040037"),
    ("ap-northeast-2", "366743142698"),
    ("ap-south-1", "720646828776"),
    ("ap-southeast-1", "121021644041"),
    ("ap-southeast-2", "783357654285"),
    ("ca-central-1", "341280168497"),
    ("cn-north-1", "450853457545"),
    ("cn-northwest-1", "451049120500"),
    ("eu-central-1", "492215442770"),
    ("eu-north-1", "662702820516"),
    ("eu-west-1", "141502667606"),
    ("eu-west-2", "764974769150"),
    ("eu-west-3", "659782779980"),
    ("me-south-1", "801668240914"),
    ("sa-east-1", "737474898029"),
    ("us-east-1", "683313688378"),
    ("us-east-2", "257758044811"),
    ("us-gov-west-1", "414596584902"),
    ("us-west-1", "746614075791"),
    ("us-west-2", "246618743249"),
];

const ALGORITHM_ACCOUNTS: &[(&str, &str)] = &[
    ("ap-east-1", "286214385809"),
    ("ap-northeast-1", "351501993468"),
    ("ap-northeast-2", "835164637446"),
    ("ap-south-1", "991648021394"),
    ("ap-southeast-1", "475088953585"),
    ("ap-southeast-2", "712309505854"),
    ("ca-central-1", "469771592824"),
    ("cn-north-1", "390948362332"),
    ("cn-northwest-1", "387376663083"),
    ("eu-central-1", "664544806723"),
    ("eu-north-1", "669576153137"),
    ("eu-west-1", "438346466558"),
    ("eu-west-2", "644912444149"),
    ("eu-west-3", "749696950732"),
    ("me-south-1", "249704162688"),
    ("sa-east-1", "855470959533"),
    ("us-east-1", "382416733822"),
    ("us-east-2", "404615174143"),
    ("us-gov-west-1", "226302683700"),
    ("us-west-1", "632365934929"),
    ("us-west-2", "174872318107"),
];

const MODEL_MONITOR_ACCOUNTS: &[(&str, &str)] = &[
    ("ap-east-1", "001633400207"),
    ("ap-northeast-1", "574779866223"),
    ("ap-northeast-2", "709848358524"),
    ("ap-south-1", "126357580389"),
    ("ap-southeast-1", "245545462676"),
    ("ap-southeast-2", "563025443158"),
    ("ca-central-1", "536280801234"),
    ("cn-north-1", "453000072557"),
    ("cn-northwest-1", "453252182341"),
    ("eu-central-1", "048819808253"),
    ("eu-north-1", "895015795356"),
    ("eu-west-1", "468650794304"),
    ("eu-west-2", "749857270468"),
    ("eu-west-3", "680080141114"),
    ("me-south-1", "607024016150"),
    ("sa-east-1", "539772159869"),
    ("us-east-1", "156813124566"),
    ("us-east-2", "777275614652"),
    ("us-west-1", "890145073186"),
    ("us-west-2", "159807026194"),
];

const CLARIFY_ACCOUNTS: &[(&str, &str)] = &[
    ("ap-east-1", "098760798382"),
    ("ap-northeast-1", "377024640650"),
    ("ap-northeast-2", "263625296855"),
    ("ap-south-1", "452307495513"),
    ("ap-southeast-1", "834264404009"),
    ("ap-southeast-2", "007051062584"),
    ("ca-central-1", "675030665977"),
    ("eu-central-1", "017069133835"),
    ("eu-north-1", "763603941244"),
    ("eu-west-1", "131013547314"),
    ("eu-west-2", "440796970383"),
    ("eu-west-3", "341593696636"),
    ("me-south-1", "986000313247"),
    ("sa-east-1", "520018980103"),
    ("us-east-1", "205585389593"),
    ("us-east-2", "211330385671"),
    ("us-west-1", "740489534195"),
    ("us-west-2", "306415355426"),
];

/// Resolves built-in image URIs, consulting config overrides first
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl ImageRegistry {
    pub fn new(overrides: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { overrides }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.image_accounts.clone())
    }

    /// Registry account for `family` in `region`
    pub fn account(&self, family: ImageFamily, region: &str) -> Option<String> {
        if let Some(account) = self.overrides.get(family.as_str()).and_then(|by_region| by_region.get(region)) {
            return Some(account.clone());
        }
        family
            .builtin_accounts()
            .iter()
            .find(|(r, _)| *r == region)
            .map(|(_, account)| account.to_string())
    }

    /// Image for a built-in training/inference framework
    pub fn framework_image(&self, framework: &str, version: &str, region: &str) -> Result<String> {
        let framework = framework.trim().to_lowercase();
        let (family, repository) = if framework == "xgboost" {
            (ImageFamily::Xgboost, format!("sagemaker-xgboost:{}", version.trim()))
        } else if FIRST_PARTY_ALGORITHMS.contains(&framework.as_str()) {
            (ImageFamily::Algorithms, format!("{}:1", framework))
        } else {
            return Err(lookup_error(&framework, region));
        };
        self.image(family, &framework, &repository, region)
    }

    /// Model Monitor analyzer image used by data and model quality monitors
    pub fn model_monitor_image(&self, region: &str) -> Result<String> {
        self.image(
            ImageFamily::ModelMonitor,
            "model-monitor",
            "sagemaker-model-monitor-analyzer",
            region,
        )
    }

    /// Clarify processing image used by bias and explainability monitors
    pub fn clarify_image(&self, region: &str) -> Result<String> {
        self.image(ImageFamily::Clarify, "clarify", "sagemaker-clarify-processing:1.0", region)
    }

    fn image(&self, family: ImageFamily, framework: &str, repository: &str, region: &str) -> Result<String> {
        let account = self.account(family, region).ok_or_else(|| lookup_error(framework, region))?;
        Ok(format!("{}.dkr.ecr.{}.{}/{}", account, region, ecr_domain(region), repository))
    }
}

fn ecr_domain(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    }
}

fn lookup_error(framework: &str, region: &str) -> ParamsError {
    log::error!("No built-in image for {} in {}", framework, region);
    ParamsError::ImageLookup {
        framework: framework.to_string(),
        region: region.to_string(),
    }
}
