use pkg_types::config::ScoringConfig;
use pkg_types::findings::AnnotatedFlow;
use pkg_types::flow::Flow;
use pkg_types::network_policy::NetworkPolicy;

use crate::protection::is_flow_protected;
use crate::risk::score_flow;

/// Every flow, in input order, with its gap and risk status.
/// Denied flows are never risky or unprotected.
pub fn annotate_flows(
    flows: &[Flow],
    policies: &[NetworkPolicy],
    config: &ScoringConfig,
) -> Vec<AnnotatedFlow> {
    flows
        .iter()
        .map(|flow| {
            let risky = score_flow(flow, config);
            AnnotatedFlow {
                flow: flow.clone(),
                is_risky: risky.is_some(),
                is_unprotected: flow.is_allowed() && !is_flow_protected(flow, policies),
                risk_score: risky.map_or(0, |r| r.risk_score),
            }
        })
        .collect()
}
