//! Data model shared by the kubeseg loader, analysis core and CLI.

pub mod config;
pub mod document;
pub mod findings;
pub mod flow;
pub mod intent;
pub mod labels;
pub mod network_policy;
pub mod validate;
