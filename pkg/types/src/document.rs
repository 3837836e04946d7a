//! The standard policy-document shape emitted for review and for storage
//! next to existing policy files.

use pkg_constants::policy::{POLICY_API_VERSION, POLICY_KIND, POLICY_TYPE_INGRESS};
use serde::{Deserialize, Serialize};

use crate::flow::{PortProtocol, Protocol};
use crate::labels::LabelMap;
use crate::network_policy::{IngressRule, NetworkPolicy, PodSelector};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub api_version: String,
    pub kind: String,
    pub metadata: PolicyMetadata,
    pub spec: PolicySpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyMetadata {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    pub pod_selector: LabelSelector,
    pub policy_types: Vec<String>,
    #[serde(default)]
    pub ingress: Vec<IngressRuleDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: LabelMap,
}

/// One ingress rule. `from` is omitted when empty, which means
/// "from anywhere" in the target format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngressRuleDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<PeerDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeerDocument {
    pub pod_selector: LabelSelector,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortDocument {
    pub port: u16,
    pub protocol: Protocol,
}

impl From<PortProtocol> for PortDocument {
    fn from(pp: PortProtocol) -> Self {
        Self {
            port: pp.port,
            protocol: pp.protocol,
        }
    }
}

impl From<PortDocument> for PortProtocol {
    fn from(doc: PortDocument) -> Self {
        PortProtocol::new(doc.port, doc.protocol)
    }
}

impl IngressRuleDocument {
    /// A rule admitting pods matching `from` (wildcard when empty) on `ports`.
    pub fn new(from: LabelMap, ports: impl IntoIterator<Item = PortProtocol>) -> Self {
        let from = if from.is_empty() {
            vec![]
        } else {
            vec![PeerDocument {
                pod_selector: LabelSelector { match_labels: from },
            }]
        };
        Self {
            from,
            ports: ports.into_iter().map(PortDocument::from).collect(),
        }
    }
}

impl PolicyDocument {
    /// An ingress-only document selecting `pod_labels` in `namespace`.
    pub fn ingress(
        name: impl Into<String>,
        namespace: impl Into<String>,
        pod_labels: LabelMap,
        ingress: Vec<IngressRuleDocument>,
    ) -> Self {
        Self {
            api_version: POLICY_API_VERSION.to_string(),
            kind: POLICY_KIND.to_string(),
            metadata: PolicyMetadata {
                name: name.into(),
                namespace: namespace.into(),
            },
            spec: PolicySpec {
                pod_selector: LabelSelector {
                    match_labels: pod_labels,
                },
                policy_types: vec![POLICY_TYPE_INGRESS.to_string()],
                ingress,
            },
        }
    }

    /// Render an existing policy without changing what it admits.
    ///
    /// A rule whose sources include a wildcard pod selector or any namespace
    /// selector admits every source and renders without `from`. A rule with
    /// no sources at all admits nothing and is left out, since an entry
    /// without `from` would admit everything.
    pub fn from_policy(policy: &NetworkPolicy) -> Self {
        let ingress = policy
            .ingress
            .iter()
            .filter(|rule| !rule.from_pod_selectors.is_empty() || !rule.from_ns_selectors.is_empty())
            .map(|rule| {
                let any_source = !rule.from_ns_selectors.is_empty()
                    || rule.from_pod_selectors.iter().any(PodSelector::is_wildcard);
                let from = if any_source {
                    vec![]
                } else {
                    rule.from_pod_selectors
                        .iter()
                        .map(|s| PeerDocument {
                            pod_selector: LabelSelector {
                                match_labels: s.match_labels.clone(),
                            },
                        })
                        .collect()
                };
                IngressRuleDocument {
                    from,
                    ports: rule.ports.iter().copied().map(PortDocument::from).collect(),
                }
            })
            .collect();
        Self::ingress(
            policy.name.clone(),
            policy.namespace.clone(),
            policy.pod_selector.clone(),
            ingress,
        )
    }

    /// Convert back into the evaluator's model. A rule without `from`
    /// admits every source pod.
    pub fn to_network_policy(&self) -> NetworkPolicy {
        let ingress = self
            .spec
            .ingress
            .iter()
            .map(|rule| {
                let from_pod_selectors = if rule.from.is_empty() {
                    vec![PodSelector::default()]
                } else {
                    rule.from
                        .iter()
                        .map(|peer| PodSelector::new(peer.pod_selector.match_labels.clone()))
                        .collect()
                };
                IngressRule {
                    from_pod_selectors,
                    from_ns_selectors: vec![],
                    ports: rule.ports.iter().copied().map(PortProtocol::from).collect(),
                }
            })
            .collect();
        NetworkPolicy {
            name: self.metadata.name.clone(),
            namespace: self.metadata.namespace.clone(),
            pod_selector: self.spec.pod_selector.match_labels.clone(),
            ingress,
            egress: vec![],
        }
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
