//! Validation applied at the loading boundary. The analysis core assumes its
//! input already passed these checks and does not re-validate.

use anyhow::{Result, bail};
use pkg_constants::network::{MAX_NAME_LEN, MIN_PORT};

use crate::flow::{Flow, PortProtocol};
use crate::intent::IntentRule;
use crate::labels::LabelMap;
use crate::network_policy::NetworkPolicy;

/// Validate a Kubernetes-style resource name.
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("name must not be empty");
    }
    if name.len() > MAX_NAME_LEN {
        bail!("name '{}' exceeds {} characters (got {})", name, MAX_NAME_LEN, name.len());
    }
    if name.starts_with('-') || name.ends_with('-') {
        bail!("name '{}' must not start or end with a hyphen", name);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        bail!(
            "name '{}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]",
            name
        );
    }
    Ok(())
}

pub fn validate_port(pp: &PortProtocol) -> Result<()> {
    if pp.port < MIN_PORT {
        bail!("port must be in 1-65535 (got {})", pp.port);
    }
    Ok(())
}

pub fn validate_labels(labels: &LabelMap) -> Result<()> {
    if labels.keys().any(|k| k.is_empty()) {
        bail!("label keys must not be empty");
    }
    Ok(())
}

pub fn validate_flow(flow: &Flow) -> Result<()> {
    validate_name(&flow.src_ns)?;
    validate_name(&flow.dst_ns)?;
    if flow.src_pod.is_empty() || flow.dst_pod.is_empty() {
        bail!("flow {}→{} has an empty pod name", flow.src_ns, flow.dst_ns);
    }
    validate_labels(&flow.src_labels)?;
    validate_labels(&flow.dst_labels)?;
    validate_port(&flow.port_protocol())
}

pub fn validate_policy(policy: &NetworkPolicy) -> Result<()> {
    validate_name(&policy.name)?;
    validate_name(&policy.namespace)?;
    validate_labels(&policy.pod_selector)?;
    for rule in &policy.ingress {
        for selector in &rule.from_pod_selectors {
            validate_labels(&selector.match_labels)?;
        }
        for selector in &rule.from_ns_selectors {
            validate_labels(&selector.match_labels)?;
        }
        rule.ports.iter().try_for_each(validate_port)?;
    }
    for rule in &policy.egress {
        rule.ports.iter().try_for_each(validate_port)?;
    }
    Ok(())
}

pub fn validate_intent(intent: &IntentRule) -> Result<()> {
    if intent.id.trim().is_empty() {
        bail!("intent id must not be empty");
    }
    if let Some(ns) = &intent.namespace {
        validate_name(ns)?;
    }
    validate_labels(&intent.src_selector)?;
    validate_labels(&intent.dst_selector)?;
    intent.allowed_ports.iter().try_for_each(validate_port)
}
