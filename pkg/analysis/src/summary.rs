use pkg_types::findings::{DriftItem, NamespaceSummary};
use pkg_types::intent::IntentRule;
use pkg_types::network_policy::NetworkPolicy;
use std::collections::{BTreeMap, BTreeSet};

use crate::drift::resolve_intent_namespace;

#[derive(Default)]
struct Counts {
    intents: usize,
    aligned: usize,
    drift: usize,
}

/// Per-namespace roll-up, sorted by namespace.
///
/// Namespaces come from the policies and from intents whose namespace could
/// be attributed. A policy counts as aligned only when no over-permissive
/// item names it; one unjustified selector excludes the whole policy.
/// Unattributed intents and drift items without a namespace are left out.
pub fn calculate_namespace_summary(
    intents: &[IntentRule],
    policies: &[NetworkPolicy],
    missing: &[DriftItem],
    over_permissive: &[DriftItem],
) -> Vec<NamespaceSummary> {
    let mut counts: BTreeMap<&str, Counts> = BTreeMap::new();

    let flagged: BTreeSet<(&str, &str)> = over_permissive
        .iter()
        .filter_map(|item| Some((item.namespace.as_deref()?, item.policy_name.as_deref()?)))
        .collect();

    for policy in policies {
        let entry = counts.entry(policy.namespace.as_str()).or_default();
        if !flagged.contains(&(policy.namespace.as_str(), policy.name.as_str())) {
            entry.aligned += 1;
        }
    }

    let resolved: Vec<String> = intents
        .iter()
        .filter_map(|intent| resolve_intent_namespace(intent, policies))
        .collect();
    for ns in &resolved {
        counts.entry(ns.as_str()).or_default().intents += 1;
    }

    for item in missing.iter().chain(over_permissive) {
        if let Some(ns) = item.namespace.as_deref() {
            counts.entry(ns).or_default().drift += 1;
        }
    }

    counts
        .into_iter()
        .map(|(namespace, c)| NamespaceSummary {
            namespace: namespace.to_string(),
            intent_count: c.intents,
            aligned_count: c.aligned,
            drift_count: c.drift,
        })
        .collect()
}
