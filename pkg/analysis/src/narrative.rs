//! Pluggable narrative text for findings.
//!
//! Free-text explanations come from an external summarization service that
//! is slow and may fail; the analysis never depends on it. Callers plug an
//! implementation in, and [`TemplateSummarizer`] covers the offline case.

use pkg_types::findings::{RiskLevel, RiskyFlow};

use crate::report::GapReport;

pub trait Summarizer: Send + Sync {
    /// Human-readable name of this summarizer.
    fn name(&self) -> &str;

    /// Short explanation of one risky flow.
    fn summarize_risk(&self, risky: &RiskyFlow) -> Option<String>;

    /// Brief for a whole gap report.
    fn summarize_gaps(&self, report: &GapReport) -> Option<String> {
        let _ = report;
        None
    }
}

/// Produces no narrative.
pub struct NoopSummarizer;

impl Summarizer for NoopSummarizer {
    fn name(&self) -> &str {
        "none"
    }

    fn summarize_risk(&self, _risky: &RiskyFlow) -> Option<String> {
        None
    }
}

/// Fills fixed sentence templates from the finding's fields.
pub struct TemplateSummarizer;

impl Summarizer for TemplateSummarizer {
    fn name(&self) -> &str {
        "template"
    }

    fn summarize_risk(&self, risky: &RiskyFlow) -> Option<String> {
        let flow = &risky.flow;
        Some(format!(
            "{} risk ({}/100): {}/{} reaches {}/{} on {} ({}).",
            risky.risk_level,
            risky.risk_score,
            flow.src_ns,
            flow.src_pod,
            flow.dst_ns,
            flow.dst_pod,
            flow.port_protocol(),
            risky.reason
        ))
    }

    fn summarize_gaps(&self, report: &GapReport) -> Option<String> {
        let critical = report
            .risky_flows
            .iter()
            .filter(|r| r.risk_level == RiskLevel::Critical)
            .count();
        let mut brief = format!(
            "{} unprotected flows, {} risky ({} critical); {} least-privilege policies suggested.",
            report.unprotected_flows.len(),
            report.risky_flows.len(),
            critical,
            report.suggested_policies.len()
        );
        if let Some(top) = report.risky_flows.first() {
            brief.push_str(&format!(
                " Highest risk: {}/{} → {}/{} on {}.",
                top.flow.src_ns,
                top.flow.src_pod,
                top.flow.dst_ns,
                top.flow.dst_pod,
                top.flow.port_protocol()
            ));
        }
        Some(brief)
    }
}

/// Rebuild `risky` with each flow's narrative attached.
pub fn attach_summaries(risky: Vec<RiskyFlow>, summarizer: &dyn Summarizer) -> Vec<RiskyFlow> {
    risky
        .into_iter()
        .map(|r| {
            let summary = summarizer.summarize_risk(&r);
            RiskyFlow { summary, ..r }
        })
        .collect()
}
