//! Intent ↔ policy drift.
//!
//! Missing-policy detection asks, per intent, whether some policy grants it.
//! Over-permissive detection asks, per policy source selector, whether some
//! intent justifies it. Namespace selectors take no part in either direction.

use pkg_types::findings::{DriftItem, DriftType};
use pkg_types::flow::PortProtocol;
use pkg_types::intent::IntentRule;
use pkg_types::labels::display_labels;
use pkg_types::network_policy::{IngressRule, NetworkPolicy, PodSelector};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::selector::{observed_covered_by_selector, selector_covers_intent_selector};

/// Set containment on `(port, protocol)` pairs.
fn is_port_subset(subset: &[PortProtocol], superset: &[PortProtocol]) -> bool {
    let superset: BTreeSet<&PortProtocol> = superset.iter().collect();
    subset.iter().all(|pp| superset.contains(pp))
}

/// A rule port list grants `required` when it is empty (all ports) or a superset.
fn ports_granted(rule_ports: &[PortProtocol], required: &[PortProtocol]) -> bool {
    rule_ports.is_empty() || is_port_subset(required, rule_ports)
}

fn format_ports(ports: &[PortProtocol]) -> String {
    if ports.is_empty() {
        return "all ports".to_string();
    }
    ports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn policy_selects_intent_destination(policy: &NetworkPolicy, intent: &IntentRule) -> bool {
    observed_covered_by_selector(&intent.dst_selector, &policy.pod_selector)
}

fn intent_covered_by_policy(intent: &IntentRule, policy: &NetworkPolicy) -> bool {
    if !policy_selects_intent_destination(policy, intent) {
        return false;
    }
    policy.ingress.iter().any(|rule| {
        rule.from_pod_selectors
            .iter()
            .any(|s| selector_covers_intent_selector(&s.match_labels, &intent.src_selector))
            && ports_granted(&rule.ports, &intent.allowed_ports)
    })
}

/// Attribute a namespace to an intent: its own when declared, otherwise the
/// single namespace among policies selecting its destination. Ambiguous or
/// absent candidates leave it unresolved.
pub fn resolve_intent_namespace(intent: &IntentRule, policies: &[NetworkPolicy]) -> Option<String> {
    if let Some(ns) = &intent.namespace {
        return Some(ns.clone());
    }
    let candidates: BTreeSet<&str> = policies
        .iter()
        .filter(|p| policy_selects_intent_destination(p, intent))
        .map(|p| p.namespace.as_str())
        .collect();
    match candidates.len() {
        1 => candidates.into_iter().next().map(str::to_string),
        0 => None,
        n => {
            debug!("Intent {} matches policies in {} namespaces", intent.id, n);
            None
        }
    }
}

/// Intents that no policy grants, in input order.
pub fn find_missing_policies_for_intent(
    intents: &[IntentRule],
    policies: &[NetworkPolicy],
) -> Vec<DriftItem> {
    let missing: Vec<DriftItem> = intents
        .iter()
        .filter(|intent| !policies.iter().any(|p| intent_covered_by_policy(intent, p)))
        .map(|intent| {
            let namespace = resolve_intent_namespace(intent, policies);
            let target = match &namespace {
                Some(ns) => format!("in namespace '{}'", ns),
                None => {
                    warn!("Intent {}: namespace unresolved", intent.id);
                    "(namespace unresolved)".to_string()
                }
            };
            DriftItem {
                drift_type: DriftType::MissingPolicy,
                intent_id: Some(intent.id.clone()),
                policy_name: None,
                namespace,
                description: intent.description.clone(),
                suggested_action: format!(
                    "Create NetworkPolicy {} to allow {} → {} on {}",
                    target,
                    display_labels(&intent.src_selector),
                    display_labels(&intent.dst_selector),
                    format_ports(&intent.allowed_ports)
                ),
            }
        })
        .collect();

    info!(
        "Missing-policy scan: {} intents, {} missing",
        intents.len(),
        missing.len()
    );
    missing
}

fn selector_justified(
    policy: &NetworkPolicy,
    rule: &IngressRule,
    selector: &PodSelector,
    intents: &[IntentRule],
) -> bool {
    intents.iter().any(|intent| {
        policy_selects_intent_destination(policy, intent)
            && selector_covers_intent_selector(&selector.match_labels, &intent.src_selector)
            && (rule.allows_all_ports() || is_port_subset(&rule.ports, &intent.allowed_ports))
    })
}

fn over_permissive_item(policy: &NetworkPolicy, selector: &PodSelector) -> DriftItem {
    let (description, suggested_action) = if selector.is_wildcard() {
        (
            format!(
                "Policy '{}' allows traffic from any pod (wildcard selector)",
                policy.name
            ),
            format!(
                "Restrict policy '{}' to only allow traffic from pods matching intent rules",
                policy.name
            ),
        )
    } else {
        (
            format!(
                "Policy '{}' allows traffic from {} that is not covered by any intent",
                policy.name,
                display_labels(&selector.match_labels)
            ),
            format!(
                "Review policy '{}' and either add corresponding intent rule or restrict the policy",
                policy.name
            ),
        )
    };
    DriftItem {
        drift_type: DriftType::OverPermissive,
        intent_id: None,
        policy_name: Some(policy.name.clone()),
        namespace: Some(policy.namespace.clone()),
        description,
        suggested_action,
    }
}

/// Source selectors no intent justifies, in policy/rule/selector order.
pub fn find_over_permissive_policies(
    intents: &[IntentRule],
    policies: &[NetworkPolicy],
) -> Vec<DriftItem> {
    let mut over_permissive = Vec::new();

    for policy in policies {
        for rule in &policy.ingress {
            for selector in &rule.from_pod_selectors {
                if selector_justified(policy, rule, selector, intents) {
                    continue;
                }
                debug!(
                    "Policy {}/{}: source {} not justified by any intent",
                    policy.namespace,
                    policy.name,
                    display_labels(&selector.match_labels)
                );
                over_permissive.push(over_permissive_item(policy, selector));
            }
        }
    }

    info!(
        "Over-permissive scan: {} policies, {} items",
        policies.len(),
        over_permissive.len()
    );
    over_permissive
}
