//! Matching and analysis engine.
//!
//! Every entry point is a pure, synchronous function of the flows, policies
//! and intents passed in. Input is expected to have passed the loader's
//! validation; behavior on malformed records is unspecified.

pub mod annotate;
pub mod drift;
pub mod narrative;
pub mod protection;
pub mod report;
pub mod risk;
pub mod selector;
pub mod summary;
pub mod synth;

pub use annotate::annotate_flows;
pub use drift::{find_missing_policies_for_intent, find_over_permissive_policies};
pub use narrative::{NoopSummarizer, Summarizer, TemplateSummarizer};
pub use protection::{find_unprotected_flows, is_flow_protected};
pub use report::{DriftReport, GapReport, analyze_drift, analyze_gaps};
pub use risk::find_risky_flows;
pub use summary::calculate_namespace_summary;
pub use synth::suggest_policies;
