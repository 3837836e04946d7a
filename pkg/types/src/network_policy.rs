use serde::{Deserialize, Serialize};

use crate::flow::PortProtocol;
use crate::labels::LabelMap;

/// Network policy controlling ingress/egress traffic for pods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkPolicy {
    pub name: String,
    pub namespace: String,
    /// Label selector for pods this policy applies to
    #[serde(default)]
    pub pod_selector: LabelMap,
    /// Allowed inbound traffic rules
    #[serde(default)]
    pub ingress: Vec<IngressRule>,
    /// Allowed outbound traffic rules (carried, never evaluated)
    #[serde(default)]
    pub egress: Vec<EgressRule>,
}

/// Match pods whose labels are a superset of `match_labels`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodSelector {
    #[serde(default)]
    pub match_labels: LabelMap,
}

impl PodSelector {
    pub fn new(match_labels: LabelMap) -> Self {
        Self { match_labels }
    }

    /// An empty selector matches every pod.
    pub fn is_wildcard(&self) -> bool {
        self.match_labels.is_empty()
    }
}

/// Match namespaces whose labels are a superset of `match_labels`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceSelector {
    #[serde(default)]
    pub match_labels: LabelMap,
}

/// Inbound traffic rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngressRule {
    /// Source pods allowed
    #[serde(default)]
    pub from_pod_selectors: Vec<PodSelector>,
    /// Source namespaces allowed
    #[serde(default)]
    pub from_ns_selectors: Vec<NamespaceSelector>,
    /// Ports allowed; empty means all ports
    #[serde(default)]
    pub ports: Vec<PortProtocol>,
}

impl IngressRule {
    pub fn allows_all_ports(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Outbound traffic rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EgressRule {
    /// Destination pods allowed
    #[serde(default)]
    pub to_pod_selectors: Vec<PodSelector>,
    /// Destination namespaces allowed
    #[serde(default)]
    pub to_ns_selectors: Vec<NamespaceSelector>,
    /// Ports allowed
    #[serde(default)]
    pub ports: Vec<PortProtocol>,
}
