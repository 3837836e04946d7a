//! Entities derived by the analysis core. They are built once and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::document::PolicyDocument;
use crate::flow::Flow;
use crate::labels::LabelMap;
use crate::network_policy::NetworkPolicy;

/// An allowed flow that no policy authorizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GapFlow {
    pub flow: Flow,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// An allowed flow whose heuristic score crossed the reporting threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskyFlow {
    pub flow: Flow,
    /// Normalized score, 1..=100
    pub risk_score: u32,
    pub reason: String,
    pub risk_level: RiskLevel,
    /// Narrative attached by a summarizer, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DriftType {
    MissingPolicy,
    OverPermissive,
}

/// A discrepancy between declared intent and the policy set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriftItem {
    #[serde(rename = "type")]
    pub drift_type: DriftType,
    #[serde(default)]
    pub intent_id: Option<String>,
    #[serde(default)]
    pub policy_name: Option<String>,
    /// `None` when the namespace could not be attributed
    pub namespace: Option<String>,
    pub description: String,
    pub suggested_action: String,
}

/// Per-namespace roll-up of drift analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceSummary {
    pub namespace: String,
    pub intent_count: usize,
    pub aligned_count: usize,
    pub drift_count: usize,
}

/// A least-privilege policy proposed for one destination group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestedPolicy {
    pub namespace: String,
    pub target_labels: LabelMap,
    pub policy: PolicyDocument,
}

impl SuggestedPolicy {
    /// YAML with the suggestion header line.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(format!(
            "{}\n{}",
            pkg_constants::policy::SUGGESTION_HEADER,
            self.policy.to_yaml()?
        ))
    }

    pub fn to_network_policy(&self) -> NetworkPolicy {
        self.policy.to_network_policy()
    }
}

/// Any flow with its gap and risk status, for visualization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedFlow {
    #[serde(flatten)]
    pub flow: Flow,
    pub is_risky: bool,
    pub is_unprotected: bool,
    /// Normalized score when risky, 0 otherwise
    pub risk_score: u32,
}
