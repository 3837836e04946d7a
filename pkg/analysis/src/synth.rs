//! Least-privilege policy synthesis from unprotected flows.
//!
//! Flows are grouped by destination (namespace + canonical labels). Within a
//! group the source labels seen on each port are merged down to the pairs
//! they have in common, and ports whose merged source labels agree share one
//! ingress rule. Every grouping is keyed
//! on canonical strings held in ordered maps, so identical input always
//! produces identical output order.

use pkg_constants::policy::{SUGGESTION_FALLBACK_APP, SUGGESTION_NAME_PREFIX};
use pkg_types::document::{IngressRuleDocument, PolicyDocument};
use pkg_types::findings::{GapFlow, SuggestedPolicy};
use pkg_types::flow::{Flow, PortProtocol};
use pkg_types::labels::{LabelMap, canonical_labels};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Keys present in both maps with identical values.
fn intersect_labels(a: &LabelMap, b: &LabelMap) -> LabelMap {
    a.iter()
        .filter(|(k, v)| b.get(*k) == Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Source clusters for one port. A flow joins the first cluster it shares
/// at least one label pair with, narrowing it to the common pairs; labels
/// with nothing in common stay separate rather than widening to a wildcard.
fn merge_sources(mut sources: Vec<&LabelMap>) -> Vec<LabelMap> {
    sources.sort_by_key(|labels| canonical_labels(labels));
    let mut clusters: Vec<LabelMap> = Vec::new();
    'next: for labels in sources {
        for cluster in clusters.iter_mut() {
            let common = intersect_labels(cluster, labels);
            if !common.is_empty() || *cluster == *labels {
                *cluster = common;
                continue 'next;
            }
        }
        clusters.push(labels.clone());
    }
    clusters
}

/// Merged source labels per port, then ports regrouped by merged labels.
fn ingress_rules(flows: &[&Flow]) -> Vec<IngressRuleDocument> {
    let mut per_port: BTreeMap<PortProtocol, Vec<&LabelMap>> = BTreeMap::new();
    for flow in flows {
        per_port
            .entry(flow.port_protocol())
            .or_default()
            .push(&flow.src_labels);
    }

    let mut per_source: BTreeMap<String, (LabelMap, BTreeSet<PortProtocol>)> = BTreeMap::new();
    for (pp, sources) in per_port {
        for merged in merge_sources(sources) {
            per_source
                .entry(canonical_labels(&merged))
                .or_insert_with(|| (merged, BTreeSet::new()))
                .1
                .insert(pp);
        }
    }

    per_source
        .into_values()
        .map(|(from, ports)| IngressRuleDocument::new(from, ports))
        .collect()
}

fn suggestion_name(namespace: &str, target_labels: &LabelMap) -> String {
    let app = target_labels
        .get("app")
        .map(String::as_str)
        .unwrap_or(SUGGESTION_FALLBACK_APP);
    format!("{}-{}-{}", SUGGESTION_NAME_PREFIX, namespace, app)
}

/// One suggested policy per destination group, ordered by namespace then
/// canonical destination labels.
pub fn suggest_policies(unprotected: &[GapFlow]) -> Vec<SuggestedPolicy> {
    let mut groups: BTreeMap<(String, String), Vec<&Flow>> = BTreeMap::new();
    for gap in unprotected {
        let key = (gap.flow.dst_ns.clone(), canonical_labels(&gap.flow.dst_labels));
        groups.entry(key).or_default().push(&gap.flow);
    }

    let mut used_names: BTreeSet<String> = BTreeSet::new();
    let suggestions: Vec<SuggestedPolicy> = groups
        .into_iter()
        .map(|((namespace, _), flows)| {
            let target_labels = flows[0].dst_labels.clone();

            // Two groups can share an app label; keep names unique.
            let base = suggestion_name(&namespace, &target_labels);
            let mut name = base.clone();
            let mut n = 2;
            while !used_names.insert(name.clone()) {
                name = format!("{}-{}", base, n);
                n += 1;
            }

            let ingress = ingress_rules(&flows);
            debug!(
                "Suggesting {}/{}: {} flows → {} ingress rules",
                namespace,
                name,
                flows.len(),
                ingress.len()
            );
            SuggestedPolicy {
                policy: PolicyDocument::ingress(name, namespace.clone(), target_labels.clone(), ingress),
                namespace,
                target_labels,
            }
        })
        .collect();

    info!(
        "Synthesized {} policies from {} unprotected flows",
        suggestions.len(),
        unprotected.len()
    );
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::make_flow;
    use crate::protection::find_unprotected_flows;
    use pkg_types::labels::labels;

    fn gap(flow: Flow) -> GapFlow {
        GapFlow {
            flow,
            reason: String::new(),
        }
    }

    fn payments_flow(team: &str, port: u16) -> Flow {
        make_flow(
            "web",
            labels([("team", team)]),
            "prod",
            labels([("app", "payments")]),
            port,
        )
    }

    #[test]
    fn divergent_sources_on_same_port_stay_separate() {
        let suggestions =
            suggest_policies(&[gap(payments_flow("b", 8080)), gap(payments_flow("a", 8080))]);
        assert_eq!(suggestions.len(), 1);
        let rules = &suggestions[0].policy.spec.ingress;
        assert_eq!(rules.len(), 2, "team differs, so the sources do not merge");
        assert_eq!(rules[0].from[0].pod_selector.match_labels, labels([("team", "a")]));
        assert_eq!(rules[1].from[0].pod_selector.match_labels, labels([("team", "b")]));
        for rule in rules {
            assert_eq!(rule.ports.len(), 1);
            assert_eq!(rule.ports[0].port, 8080);
            assert_eq!(rule.ports[0].protocol, pkg_types::flow::Protocol::Tcp);
        }
    }

    #[test]
    fn shared_pairs_survive_and_divergent_keys_drop() {
        let merged = merge_sources(vec![
            &labels([("app", "web"), ("pod-template-hash", "abc")]),
            &labels([("app", "web"), ("pod-template-hash", "def")]),
        ]);
        assert_eq!(merged, vec![labels([("app", "web")])]);
    }

    #[test]
    fn sources_without_labels_yield_rule_without_from() {
        let flow = make_flow("web", LabelMap::new(), "prod", labels([("app", "payments")]), 443);
        let suggestions = suggest_policies(&[gap(flow.clone()), gap(flow)]);
        let rules = &suggestions[0].policy.spec.ingress;
        assert_eq!(rules.len(), 1);
        assert!(rules[0].from.is_empty());
        assert_eq!(rules[0].ports[0].port, 443);
    }

    #[test]
    fn distinct_sources_on_distinct_ports_get_one_rule_each() {
        let suggestions =
            suggest_policies(&[gap(payments_flow("a", 8080)), gap(payments_flow("b", 8443))]);
        assert_eq!(suggestions.len(), 1);
        let suggestion = &suggestions[0];
        assert_eq!(suggestion.namespace, "prod");
        assert_eq!(suggestion.target_labels, labels([("app", "payments")]));
        assert_eq!(suggestion.policy.metadata.name, "protect-prod-payments");

        let rules = &suggestion.policy.spec.ingress;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].from[0].pod_selector.match_labels, labels([("team", "a")]));
        assert_eq!(rules[0].ports[0].port, 8080);
        assert_eq!(rules[1].from[0].pod_selector.match_labels, labels([("team", "b")]));
        assert_eq!(rules[1].ports[0].port, 8443);
    }

    #[test]
    fn ports_with_same_merged_source_share_a_rule() {
        let mut a = payments_flow("a", 443);
        a.src_labels.insert("app".to_string(), "web".to_string());
        let mut b = payments_flow("b", 443);
        b.src_labels.insert("app".to_string(), "web".to_string());
        let c = make_flow("web", labels([("app", "web")]), "prod", labels([("app", "payments")]), 80);

        let suggestions = suggest_policies(&[gap(a), gap(b), gap(c)]);
        let rules = &suggestions[0].policy.spec.ingress;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].from[0].pod_selector.match_labels, labels([("app", "web")]));
        let ports: Vec<u16> = rules[0].ports.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![80, 443]);
    }

    #[test]
    fn groups_are_ordered_and_named_deterministically() {
        let flows = vec![
            gap(make_flow("x", LabelMap::new(), "shop", labels([("app", "cart"), ("v", "2")]), 80)),
            gap(make_flow("x", LabelMap::new(), "bank", LabelMap::new(), 80)),
            gap(make_flow("x", LabelMap::new(), "shop", labels([("app", "cart")]), 80)),
        ];
        let suggestions = suggest_policies(&flows);
        let names: Vec<&str> = suggestions
            .iter()
            .map(|s| s.policy.metadata.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["protect-bank-pods", "protect-shop-cart", "protect-shop-cart-2"]
        );

        let mut reversed = flows.clone();
        reversed.reverse();
        let again = suggest_policies(&reversed);
        let yaml: Vec<String> = suggestions.iter().map(|s| s.to_yaml().unwrap()).collect();
        let yaml_again: Vec<String> = again.iter().map(|s| s.to_yaml().unwrap()).collect();
        assert_eq!(yaml, yaml_again, "output must not depend on input order");
    }

    #[test]
    fn suggestions_protect_the_flows_they_came_from() {
        let flows = vec![
            payments_flow("a", 8080),
            payments_flow("b", 8443),
            make_flow("dev", labels([("app", "web"), ("v", "1")]), "prod", labels([("role", "db")]), 5432),
            make_flow("dev", labels([("app", "web"), ("v", "2")]), "prod", labels([("role", "db")]), 5432),
            make_flow("ops", labels([("app", "backup")]), "prod", labels([("role", "db")]), 5432),
        ];
        let gaps = find_unprotected_flows(&flows, &[]);
        assert_eq!(gaps.len(), flows.len());

        let policies: Vec<_> = suggest_policies(&gaps)
            .iter()
            .map(SuggestedPolicy::to_network_policy)
            .collect();
        assert!(find_unprotected_flows(&flows, &policies).is_empty());
    }

    #[test]
    fn yaml_document_shape() {
        let suggestions = suggest_policies(&[gap(payments_flow("a", 8080))]);
        let yaml = suggestions[0].to_yaml().unwrap();
        let body = yaml
            .strip_prefix("# Auto-generated least-privilege suggestion\n")
            .expect("header line");
        let value: serde_yaml::Value = serde_yaml::from_str(body).unwrap();
        assert_eq!(value["metadata"]["name"].as_str(), Some("protect-prod-payments"));
        assert_eq!(
            value["spec"]["ingress"][0]["from"][0]["podSelector"]["matchLabels"]["team"].as_str(),
            Some("a")
        );
        assert_eq!(value["spec"]["ingress"][0]["ports"][0]["protocol"].as_str(), Some("TCP"));
    }

    #[test]
    fn empty_input_yields_no_suggestions() {
        assert!(suggest_policies(&[]).is_empty());
    }
}
