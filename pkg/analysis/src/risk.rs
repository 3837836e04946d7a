//! Additive risk heuristic over allowed flows.
//!
//! Each condition of [`RiskFactor`] adds its configured weight, the
//! destination port adds its sensitive-port weight, and the total is
//! normalized onto 1..=100 before bucketing into a [`RiskLevel`].

use pkg_types::config::{RiskFactor, ScoringConfig};
use pkg_types::findings::{RiskLevel, RiskyFlow};
use pkg_types::flow::Flow;
use tracing::{debug, info};

const NON_PROD_ENVS: [&str; 2] = ["dev", "staging"];

/// Raw score and the reasons that contributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub raw_score: u32,
    pub reasons: Vec<String>,
}

fn label<'a>(labels: &'a pkg_types::labels::LabelMap, key: &str) -> Option<&'a str> {
    labels.get(key).map(String::as_str)
}

fn app_contains(flow: &Flow, needle: &str) -> bool {
    label(&flow.dst_labels, "app").is_some_and(|app| app.contains(needle))
}

fn is_prod_destination(flow: &Flow) -> bool {
    label(&flow.dst_labels, "env") == Some("prod") || flow.dst_ns.contains("prod")
}

fn is_non_prod_source(flow: &Flow) -> bool {
    NON_PROD_ENVS.iter().any(|env| flow.src_ns.contains(env))
        || label(&flow.src_labels, "env").is_some_and(|env| NON_PROD_ENVS.contains(&env))
}

fn applies(factor: RiskFactor, flow: &Flow) -> bool {
    match factor {
        RiskFactor::CrossNamespace => flow.is_cross_namespace(),
        RiskFactor::ProdDestination => is_prod_destination(flow),
        RiskFactor::DatabaseDestination => {
            label(&flow.dst_labels, "role") == Some("db") || app_contains(flow, "db")
        }
        RiskFactor::BackendDestination => {
            label(&flow.dst_labels, "tier") == Some("backend") || app_contains(flow, "api")
        }
        RiskFactor::NonProdToProd => is_non_prod_source(flow) && is_prod_destination(flow),
        RiskFactor::PrivilegedDestination => app_contains(flow, "admin") || app_contains(flow, "root"),
    }
}

fn describe(factor: RiskFactor) -> &'static str {
    match factor {
        RiskFactor::CrossNamespace => "cross-namespace traffic",
        RiskFactor::ProdDestination => "destination in prod environment",
        RiskFactor::DatabaseDestination => "destination is database",
        RiskFactor::BackendDestination => "destination is backend/API service",
        RiskFactor::NonProdToProd => "non-prod source reaching prod",
        RiskFactor::PrivilegedDestination => "destination is an admin/root service",
    }
}

/// Score a flow without applying the reporting threshold.
pub fn assess_flow(flow: &Flow, config: &ScoringConfig) -> RiskAssessment {
    let mut raw_score = config.base;
    let mut reasons = Vec::new();

    for factor in RiskFactor::ALL {
        let weight = config.weights.weight(factor);
        if weight > 0 && applies(factor, flow) {
            raw_score += weight;
            reasons.push(describe(factor).to_string());
        }
    }

    let port_weight = config.port_weight(flow.port);
    if port_weight > 0 {
        raw_score += port_weight;
        reasons.push(format!("sensitive port {}", flow.port));
    }

    RiskAssessment { raw_score, reasons }
}

pub fn normalize(raw_score: u32, config: &ScoringConfig) -> u32 {
    raw_score.saturating_mul(config.multiplier).min(config.max_score)
}

pub fn risk_level(score: u32, config: &ScoringConfig) -> RiskLevel {
    if score >= config.levels.critical {
        RiskLevel::Critical
    } else if score >= config.levels.high {
        RiskLevel::High
    } else if score >= config.levels.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Score one flow. `None` for denied flows and for raw scores below the
/// reporting threshold.
pub fn score_flow(flow: &Flow, config: &ScoringConfig) -> Option<RiskyFlow> {
    if !flow.is_allowed() {
        return None;
    }
    let assessment = assess_flow(flow, config);
    if assessment.raw_score < config.report_threshold {
        return None;
    }
    let risk_score = normalize(assessment.raw_score, config);
    debug!(
        "Flow {}/{} → {}/{} raw={} score={}",
        flow.src_ns, flow.src_pod, flow.dst_ns, flow.dst_pod, assessment.raw_score, risk_score
    );
    Some(RiskyFlow {
        flow: flow.clone(),
        risk_score,
        reason: assessment.reasons.join("; "),
        risk_level: risk_level(risk_score, config),
        summary: None,
    })
}

/// Risky allowed flows, highest score first. Ties keep input order.
pub fn find_risky_flows(flows: &[Flow], config: &ScoringConfig) -> Vec<RiskyFlow> {
    let mut risky: Vec<RiskyFlow> = flows.iter().filter_map(|f| score_flow(f, config)).collect();
    // sort_by_key is stable
    risky.sort_by_key(|r| std::cmp::Reverse(r.risk_score));
    info!("Risk scan: {} flows, {} risky", flows.len(), risky.len());
    risky
}
