use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use pkg_types::config::OutputFormat;
use pkg_types::findings::SuggestedPolicy;
use serde::Serialize;

/// Report wrapper. `generated_at` is the only field that varies between runs
/// over the same input.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub command: &'a str,
    pub generated_at: String,
    pub report: &'a T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn at(command: &'a str, generated_at: DateTime<Utc>, report: &'a T) -> Self {
        Self {
            command,
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            report,
        }
    }

    pub fn now(command: &'a str, report: &'a T) -> Self {
        Self::at(command, Utc::now(), report)
    }
}

/// Serialize `value` with a trailing newline.
pub fn render<T: Serialize>(format: OutputFormat, value: &T) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

/// Suggested policies as a multi-document YAML stream.
pub fn suggestions(policies: &[SuggestedPolicy]) -> Result<String> {
    let documents = policies
        .iter()
        .map(SuggestedPolicy::to_yaml)
        .collect::<Result<Vec<_>>>()?;
    Ok(documents.join("---\n"))
}
