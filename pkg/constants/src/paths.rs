//! Filesystem path constants.

/// Default config file path for kubesegctl.
pub const DEFAULT_CONFIG: &str = "/etc/kubeseg/config.yaml";

/// Default data directory holding the observed flows, policies and intents.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Observed flow records (JSON array or JSON lines).
pub const FLOWS_FILE: &str = "flows.json";

/// Declared NetworkPolicies (YAML list).
pub const POLICIES_FILE: &str = "network_policies.yaml";

/// Declared intent rules (YAML list).
pub const INTENTS_FILE: &str = "intent.yaml";
