use serde::{Deserialize, Serialize};

use crate::labels::LabelMap;

/// Transport protocol of a flow or policy port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Protocol {
    #[serde(rename = "TCP", alias = "tcp")]
    Tcp,
    #[serde(rename = "UDP", alias = "udp")]
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "{}", pkg_constants::network::PROTOCOL_TCP),
            Protocol::Udp => write!(f, "{}", pkg_constants::network::PROTOCOL_UDP),
        }
    }
}

/// A single port/protocol pair. Equality is exact on both fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortProtocol {
    pub port: u16,
    pub protocol: Protocol,
}

impl PortProtocol {
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self { port, protocol }
    }

    pub fn tcp(port: u16) -> Self {
        Self::new(port, Protocol::Tcp)
    }

    pub fn udp(port: u16) -> Self {
        Self::new(port, Protocol::Udp)
    }
}

impl std::fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.protocol, self.port)
    }
}

/// Verdict recorded by the flow observer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Deny,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Allow => write!(f, "allow"),
            Verdict::Deny => write!(f, "deny"),
        }
    }
}

/// One observed pod-to-pod flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flow {
    pub src_ns: String,
    pub src_pod: String,
    #[serde(default)]
    pub src_labels: LabelMap,
    pub dst_ns: String,
    pub dst_pod: String,
    #[serde(default)]
    pub dst_labels: LabelMap,
    pub port: u16,
    pub protocol: Protocol,
    pub verdict: Verdict,
}

impl Flow {
    pub fn port_protocol(&self) -> PortProtocol {
        PortProtocol::new(self.port, self.protocol)
    }

    /// Only allowed flows are ever analyzed.
    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allow
    }

    pub fn is_cross_namespace(&self) -> bool {
        self.src_ns != self.dst_ns
    }
}
