//! Network-related constants.

/// Protocol name for TCP as it appears in flow and policy records.
pub const PROTOCOL_TCP: &str = "TCP";

/// Protocol name for UDP as it appears in flow and policy records.
pub const PROTOCOL_UDP: &str = "UDP";

/// Lowest valid port number.
pub const MIN_PORT: u16 = 1;

/// Maximum length of a resource name (policy names, namespaces).
pub const MAX_NAME_LEN: usize = 63;
