use pkg_types::findings::GapFlow;
use pkg_types::flow::Flow;
use pkg_types::network_policy::{IngressRule, NetworkPolicy};
use tracing::{debug, info};

use crate::selector::observed_covered_by_selector;

/// Whether any policy authorizes `flow`.
///
/// A policy applies when it lives in the destination namespace and its
/// `pod_selector` covers the destination labels. Any ingress rule of an
/// applicable policy that admits the source and the flow's port authorizes
/// the flow; the scan stops at the first such rule.
pub fn is_flow_protected(flow: &Flow, policies: &[NetworkPolicy]) -> bool {
    policies
        .iter()
        .filter(|policy| policy.namespace == flow.dst_ns)
        .filter(|policy| observed_covered_by_selector(&flow.dst_labels, &policy.pod_selector))
        .any(|policy| {
            let matched = policy.ingress.iter().any(|rule| rule_authorizes(rule, flow));
            if matched {
                debug!(
                    "Flow {}/{} → {}/{} authorized by policy {}/{}",
                    flow.src_ns, flow.src_pod, flow.dst_ns, flow.dst_pod, policy.namespace, policy.name
                );
            }
            matched
        })
}

/// Namespace selectors are not evaluated; when present they admit any source.
fn source_allowed(rule: &IngressRule, flow: &Flow) -> bool {
    !rule.from_ns_selectors.is_empty()
        || rule
            .from_pod_selectors
            .iter()
            .any(|selector| observed_covered_by_selector(&flow.src_labels, &selector.match_labels))
}

fn rule_authorizes(rule: &IngressRule, flow: &Flow) -> bool {
    if !source_allowed(rule, flow) {
        return false;
    }
    rule.allows_all_ports() || rule.ports.contains(&flow.port_protocol())
}

/// Allowed flows that no policy authorizes, in input order.
/// Denied flows are never analyzed.
pub fn find_unprotected_flows(flows: &[Flow], policies: &[NetworkPolicy]) -> Vec<GapFlow> {
    let unprotected: Vec<GapFlow> = flows
        .iter()
        .filter(|flow| flow.is_allowed())
        .filter(|flow| !is_flow_protected(flow, policies))
        .map(|flow| GapFlow {
            flow: flow.clone(),
            reason: format!(
                "No policy in namespace '{}' protects destination pod '{}' from source '{}/{}' on {}",
                flow.dst_ns,
                flow.dst_pod,
                flow.src_ns,
                flow.src_pod,
                flow.port_protocol()
            ),
        })
        .collect();

    info!(
        "Protection scan: {} flows, {} policies, {} unprotected",
        flows.len(),
        policies.len(),
        unprotected.len()
    );
    unprotected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{make_flow, make_policy, make_rule};
    use pkg_types::flow::{PortProtocol, Protocol, Verdict};
    use pkg_types::labels::{LabelMap, labels};
    use pkg_types::network_policy::NamespaceSelector;

    fn web_to_api() -> Flow {
        make_flow(
            "prod",
            labels([("app", "web")]),
            "prod",
            labels([("app", "api")]),
            80,
        )
    }

    fn api_policy(ports: &[PortProtocol]) -> NetworkPolicy {
        make_policy(
            "api-allow-web",
            "prod",
            labels([("app", "api")]),
            vec![make_rule(&[labels([("app", "web")])], ports)],
        )
    }

    #[test]
    fn exact_port_match_protects() {
        let flow = web_to_api();
        assert!(is_flow_protected(&flow, &[api_policy(&[PortProtocol::tcp(80)])]));
        assert!(!is_flow_protected(&flow, &[api_policy(&[PortProtocol::tcp(443)])]));
        assert!(
            !is_flow_protected(&flow, &[api_policy(&[PortProtocol::udp(80)])]),
            "protocol must match too"
        );
    }

    #[test]
    fn empty_port_list_allows_all_ports() {
        let mut flow = web_to_api();
        flow.port = 9999;
        flow.protocol = Protocol::Udp;
        assert!(is_flow_protected(&flow, &[api_policy(&[])]));
    }

    #[test]
    fn policy_in_other_namespace_does_not_apply() {
        let mut policy = api_policy(&[]);
        policy.namespace = "staging".to_string();
        assert!(!is_flow_protected(&web_to_api(), &[policy]));
    }

    #[test]
    fn pod_selector_must_cover_destination() {
        let mut policy = api_policy(&[]);
        policy.pod_selector = labels([("app", "db")]);
        assert!(!is_flow_protected(&web_to_api(), &[policy]));
    }

    #[test]
    fn source_must_match_a_from_selector() {
        let mut flow = web_to_api();
        flow.src_labels = labels([("app", "batch")]);
        assert!(!is_flow_protected(&flow, &[api_policy(&[])]));
    }

    #[test]
    fn rule_without_from_entries_admits_nothing() {
        let policy = make_policy("bare", "prod", LabelMap::new(), vec![make_rule(&[], &[])]);
        assert!(!is_flow_protected(&web_to_api(), &[policy]));
    }

    #[test]
    fn namespace_selector_admits_any_source() {
        let mut rule = make_rule(&[], &[PortProtocol::tcp(80)]);
        rule.from_ns_selectors
            .push(NamespaceSelector { match_labels: labels([("team", "x")]) });
        let policy = make_policy("ns-sel", "prod", labels([("app", "api")]), vec![rule]);
        assert!(is_flow_protected(&web_to_api(), &[policy]));
    }

    #[test]
    fn wildcard_destination_reduces_to_ingress_matching() {
        let flow = make_flow("a", labels([("app", "web")]), "b", LabelMap::new(), 8080);
        let policy = make_policy(
            "all-pods",
            "b",
            LabelMap::new(),
            vec![make_rule(&[labels([("app", "web")])], &[PortProtocol::tcp(8080)])],
        );
        assert!(is_flow_protected(&flow, &[policy.clone()]));

        let mut other_port = flow.clone();
        other_port.port = 8081;
        assert!(!is_flow_protected(&other_port, &[policy]));
    }

    #[test]
    fn adding_a_rule_never_unprotects() {
        let flows = vec![
            web_to_api(),
            make_flow("dev", labels([("app", "web")]), "prod", labels([("app", "api")]), 443),
            make_flow("prod", labels([("app", "batch")]), "prod", labels([("app", "api")]), 80),
        ];
        let mut policy = api_policy(&[PortProtocol::tcp(80)]);
        let before: Vec<bool> = flows
            .iter()
            .map(|f| is_flow_protected(f, std::slice::from_ref(&policy)))
            .collect();

        policy
            .ingress
            .push(make_rule(&[labels([("app", "batch")])], &[PortProtocol::tcp(80)]));
        let after: Vec<bool> = flows
            .iter()
            .map(|f| is_flow_protected(f, std::slice::from_ref(&policy)))
            .collect();

        for (b, a) in before.iter().zip(&after) {
            assert!(!b || *a, "a protected flow became unprotected");
        }
        assert_eq!(before, vec![true, false, false]);
        assert_eq!(after, vec![true, false, true]);
    }

    #[test]
    fn denied_flows_are_never_reported() {
        let mut denied = web_to_api();
        denied.verdict = Verdict::Deny;
        let gaps = find_unprotected_flows(&[denied], &[]);
        assert!(gaps.is_empty());
    }

    #[test]
    fn unprotected_flow_reason_names_both_ends() {
        let flow = make_flow("dev", LabelMap::new(), "prod", labels([("role", "db")]), 5432);
        let gaps = find_unprotected_flows(&[flow.clone()], &[]);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].flow, flow);
        assert_eq!(
            gaps[0].reason,
            "No policy in namespace 'prod' protects destination pod 'prod-server' from source 'dev/dev-client' on TCP:5432"
        );
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        assert!(find_unprotected_flows(&[], &[]).is_empty());
        assert!(find_unprotected_flows(&[], &[api_policy(&[])]).is_empty());
    }

    #[test]
    fn rendered_policies_protect_the_same_flows() {
        use pkg_types::document::PolicyDocument;
        use pkg_types::labels::canonical_labels;

        let batch = make_flow("prod", labels([("app", "batch")]), "prod", labels([("app", "api")]), 80);
        let flows = [web_to_api(), batch];

        let mixed = make_policy(
            "api-mixed",
            "prod",
            labels([("app", "api")]),
            vec![make_rule(&[labels([("app", "web")]), LabelMap::new()], &[PortProtocol::tcp(80)])],
        );
        let closed = make_policy("api-closed", "prod", labels([("app", "api")]), vec![make_rule(&[], &[])]);
        let mut by_namespace = make_policy(
            "api-by-ns",
            "prod",
            labels([("app", "api")]),
            vec![make_rule(&[], &[PortProtocol::tcp(80)])],
        );
        by_namespace.ingress[0].from_ns_selectors.push(NamespaceSelector {
            match_labels: labels([("team", "shop")]),
        });

        for policy in [mixed, closed, by_namespace, api_policy(&[PortProtocol::tcp(80)])] {
            let rendered = PolicyDocument::from_policy(&policy).to_network_policy();
            for flow in &flows {
                assert_eq!(
                    is_flow_protected(flow, std::slice::from_ref(&policy)),
                    is_flow_protected(flow, std::slice::from_ref(&rendered)),
                    "policy {} changed meaning for {}",
                    policy.name,
                    canonical_labels(&flow.src_labels)
                );
            }
        }
    }
}
