//! Policy document constants.

/// `apiVersion` of emitted policy documents.
pub const POLICY_API_VERSION: &str = "networking.k8s.io/v1";

/// `kind` of emitted policy documents.
pub const POLICY_KIND: &str = "NetworkPolicy";

/// Only ingress is synthesized.
pub const POLICY_TYPE_INGRESS: &str = "Ingress";

/// First line of every suggested policy YAML.
pub const SUGGESTION_HEADER: &str = "# Auto-generated least-privilege suggestion";

/// Prefix of suggested policy names: `protect-<ns>-<app>`.
pub const SUGGESTION_NAME_PREFIX: &str = "protect";

/// Name component used when the destination has no `app` label.
pub const SUGGESTION_FALLBACK_APP: &str = "pods";
