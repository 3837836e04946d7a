use pkg_types::config::ScoringConfig;
use pkg_types::findings::{DriftItem, GapFlow, NamespaceSummary, RiskyFlow, SuggestedPolicy};
use pkg_types::flow::Flow;
use pkg_types::intent::IntentRule;
use pkg_types::network_policy::NetworkPolicy;
use serde::{Deserialize, Serialize};

use crate::drift::{
    find_missing_policies_for_intent, find_over_permissive_policies, resolve_intent_namespace,
};
use crate::narrative::{Summarizer, attach_summaries};
use crate::protection::find_unprotected_flows;
use crate::risk::find_risky_flows;
use crate::summary::calculate_namespace_summary;
use crate::synth::suggest_policies;

/// Risky flows, unprotected flows and the policies that would close the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GapReport {
    pub risky_flows: Vec<RiskyFlow>,
    pub unprotected_flows: Vec<GapFlow>,
    pub suggested_policies: Vec<SuggestedPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
}

/// Intent/policy drift in both directions plus the per-namespace roll-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriftReport {
    pub missing_policies: Vec<DriftItem>,
    pub over_permissive: Vec<DriftItem>,
    pub per_namespace_summary: Vec<NamespaceSummary>,
    /// Ids of intents whose namespace could not be attributed
    pub unattributed_intents: Vec<String>,
}

pub fn analyze_gaps(
    flows: &[Flow],
    policies: &[NetworkPolicy],
    config: &ScoringConfig,
    summarizer: &dyn Summarizer,
) -> GapReport {
    let unprotected_flows = find_unprotected_flows(flows, policies);
    let suggested_policies = suggest_policies(&unprotected_flows);
    let risky_flows = attach_summaries(find_risky_flows(flows, config), summarizer);

    let mut report = GapReport {
        risky_flows,
        unprotected_flows,
        suggested_policies,
        brief: None,
    };
    report.brief = summarizer.summarize_gaps(&report);
    report
}

pub fn analyze_drift(intents: &[IntentRule], policies: &[NetworkPolicy]) -> DriftReport {
    let missing_policies = find_missing_policies_for_intent(intents, policies);
    let over_permissive = find_over_permissive_policies(intents, policies);
    let per_namespace_summary =
        calculate_namespace_summary(intents, policies, &missing_policies, &over_permissive);
    let unattributed_intents = intents
        .iter()
        .filter(|intent| resolve_intent_namespace(intent, policies).is_none())
        .map(|intent| intent.id.clone())
        .collect();

    DriftReport {
        missing_policies,
        over_permissive,
        per_namespace_summary,
        unattributed_intents,
    }
}
