use anyhow::{Context, Result, bail};
use pkg_types::flow::Flow;
use pkg_types::intent::IntentRule;
use pkg_types::network_policy::NetworkPolicy;
use pkg_types::validate::{validate_flow, validate_intent, validate_policy};
use std::collections::HashSet;
use tracing::debug;

/// Parse flow records from a JSON array or from JSON lines (one object per
/// line, blank lines ignored).
pub fn parse_flows(content: &str) -> Result<Vec<Flow>> {
    let trimmed = content.trim_start();
    let flows: Vec<Flow> = if trimmed.is_empty() {
        Vec::new()
    } else if trimmed.starts_with('[') {
        serde_json::from_str(content).context("invalid flow array")?
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| format!("invalid flow on line {}", i + 1))
            })
            .collect::<Result<Vec<Flow>>>()?
    };

    for (i, flow) in flows.iter().enumerate() {
        validate_flow(flow).with_context(|| format!("flow #{}", i + 1))?;
    }
    debug!("Parsed {} flows", flows.len());
    Ok(flows)
}

/// Parse a YAML list of policies. Names must be unique per namespace.
pub fn parse_policies(content: &str) -> Result<Vec<NetworkPolicy>> {
    let policies: Vec<NetworkPolicy> = parse_yaml_list(content).context("invalid policy list")?;

    let mut seen = HashSet::new();
    for policy in &policies {
        validate_policy(policy)
            .with_context(|| format!("policy '{}/{}'", policy.namespace, policy.name))?;
        if !seen.insert((policy.namespace.as_str(), policy.name.as_str())) {
            bail!("duplicate policy '{}/{}'", policy.namespace, policy.name);
        }
    }
    debug!("Parsed {} policies", policies.len());
    Ok(policies)
}

/// Parse a YAML list of intents. Ids must be unique.
pub fn parse_intents(content: &str) -> Result<Vec<IntentRule>> {
    let intents: Vec<IntentRule> = parse_yaml_list(content).context("invalid intent list")?;

    let mut seen = HashSet::new();
    for (i, intent) in intents.iter().enumerate() {
        validate_intent(intent).with_context(|| format!("intent #{} ('{}')", i + 1, intent.id))?;
        if !seen.insert(intent.id.as_str()) {
            bail!("duplicate intent id '{}'", intent.id);
        }
    }
    debug!("Parsed {} intents", intents.len());
    Ok(intents)
}

/// An empty document is an empty list.
fn parse_yaml_list<T: serde::de::DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str::<Option<Vec<T>>>(content)?.unwrap_or_default())
}
