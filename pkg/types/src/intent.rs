use serde::{Deserialize, Serialize};

use crate::flow::PortProtocol;
use crate::labels::LabelMap;

/// A human-declared authorization statement, independent of any concrete policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntentRule {
    pub id: String,
    /// Namespace the intent applies to. When absent the analysis tries to
    /// attribute one from the policy set and reports it unresolved otherwise.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub src_selector: LabelMap,
    #[serde(default)]
    pub dst_selector: LabelMap,
    #[serde(default)]
    pub allowed_ports: Vec<PortProtocol>,
    #[serde(default)]
    pub description: String,
}
