use pkg_constants::risk;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The named additive conditions of the risk heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskFactor {
    CrossNamespace,
    ProdDestination,
    DatabaseDestination,
    BackendDestination,
    NonProdToProd,
    PrivilegedDestination,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 6] = [
        RiskFactor::CrossNamespace,
        RiskFactor::ProdDestination,
        RiskFactor::DatabaseDestination,
        RiskFactor::BackendDestination,
        RiskFactor::NonProdToProd,
        RiskFactor::PrivilegedDestination,
    ];

    /// Rule name as used in config files.
    pub fn name(&self) -> &'static str {
        match self {
            RiskFactor::CrossNamespace => "cross-namespace",
            RiskFactor::ProdDestination => "prod-destination",
            RiskFactor::DatabaseDestination => "database-destination",
            RiskFactor::BackendDestination => "backend-destination",
            RiskFactor::NonProdToProd => "non-prod-to-prod",
            RiskFactor::PrivilegedDestination => "privileged-destination",
        }
    }
}

/// Weight added by each risk factor. Unknown keys are rejected so a
/// misspelled factor cannot silently keep its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskWeights {
    #[serde(alias = "cross-namespace")]
    pub cross_namespace: u32,
    #[serde(alias = "prod-destination")]
    pub prod_destination: u32,
    #[serde(alias = "database-destination")]
    pub database_destination: u32,
    #[serde(alias = "backend-destination")]
    pub backend_destination: u32,
    #[serde(alias = "non-prod-to-prod")]
    pub non_prod_to_prod: u32,
    #[serde(alias = "privileged-destination")]
    pub privileged_destination: u32,
}

impl RiskWeights {
    pub fn weight(&self, factor: RiskFactor) -> u32 {
        match factor {
            RiskFactor::CrossNamespace => self.cross_namespace,
            RiskFactor::ProdDestination => self.prod_destination,
            RiskFactor::DatabaseDestination => self.database_destination,
            RiskFactor::BackendDestination => self.backend_destination,
            RiskFactor::NonProdToProd => self.non_prod_to_prod,
            RiskFactor::PrivilegedDestination => self.privileged_destination,
        }
    }

    /// `(name, weight)` for every factor, in [`RiskFactor::ALL`] order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        RiskFactor::ALL
            .into_iter()
            .map(|factor| (factor.name(), self.weight(factor)))
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            cross_namespace: risk::WEIGHT_CROSS_NAMESPACE,
            prod_destination: risk::WEIGHT_PROD_DESTINATION,
            database_destination: risk::WEIGHT_DATABASE_DESTINATION,
            backend_destination: risk::WEIGHT_BACKEND_DESTINATION,
            non_prod_to_prod: risk::WEIGHT_NON_PROD_TO_PROD,
            privileged_destination: risk::WEIGHT_PRIVILEGED_DESTINATION,
        }
    }
}

/// Cut-offs on the normalized score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelThresholds {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            critical: risk::LEVEL_CRITICAL,
            high: risk::LEVEL_HIGH,
            medium: risk::LEVEL_MEDIUM,
        }
    }
}

/// Tunable risk-scoring policy.
///
/// Example `scoring` block:
/// ```yaml
/// weights:
///   cross-namespace: 4
///   prod-destination: 5
/// report-threshold: 5
/// sensitive-ports:
///   22: 4
///   5432: 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub base: u32,
    pub weights: RiskWeights,
    #[serde(alias = "report-threshold")]
    pub report_threshold: u32,
    pub multiplier: u32,
    #[serde(alias = "max-score")]
    pub max_score: u32,
    pub levels: LevelThresholds,
    /// Port → weight. Ports not listed contribute nothing.
    #[serde(alias = "sensitive-ports")]
    pub sensitive_ports: BTreeMap<u16, u32>,
}

impl ScoringConfig {
    pub fn port_weight(&self, port: u16) -> u32 {
        self.sensitive_ports.get(&port).copied().unwrap_or(0)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: risk::BASE_SCORE,
            weights: RiskWeights::default(),
            report_threshold: risk::REPORT_THRESHOLD,
            multiplier: risk::SCORE_MULTIPLIER,
            max_score: risk::MAX_SCORE,
            levels: LevelThresholds::default(),
            sensitive_ports: risk::SENSITIVE_PORTS.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{}' (expected json or yaml)", other)),
        }
    }
}

/// kubesegctl configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// data-dir: /var/lib/kubeseg
/// flows-file: flows.json
/// output: yaml
/// scoring:
///   report-threshold: 6
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubesegConfigFile {
    #[serde(default, alias = "data-dir")]
    pub data_dir: Option<String>,
    #[serde(default, alias = "flows-file")]
    pub flows_file: Option<String>,
    #[serde(default, alias = "policies-file")]
    pub policies_file: Option<String>,
    #[serde(default, alias = "intents-file")]
    pub intents_file: Option<String>,
    #[serde(default)]
    pub output: Option<OutputFormat>,
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
