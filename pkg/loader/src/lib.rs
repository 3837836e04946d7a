//! Loading boundary for flows, policies and intents.
//!
//! Everything handed to the analysis core passes through here first:
//! records are parsed, validated, and rejected with file and record context
//! when malformed. The core does not re-validate.

pub mod parse;

use anyhow::{Context, Result};
use pkg_constants::paths::{DEFAULT_DATA_DIR, FLOWS_FILE, INTENTS_FILE, POLICIES_FILE};
use pkg_types::config::KubesegConfigFile;
use pkg_types::flow::Flow;
use pkg_types::intent::IntentRule;
use pkg_types::network_policy::NetworkPolicy;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use parse::{parse_flows, parse_intents, parse_policies};

/// Locations of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub flows: PathBuf,
    pub policies: PathBuf,
    pub intents: PathBuf,
}

impl DataPaths {
    /// Default file names under `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            flows: dir.join(FLOWS_FILE),
            policies: dir.join(POLICIES_FILE),
            intents: dir.join(INTENTS_FILE),
        }
    }

    /// Merge: explicit data dir > config file > defaults. File names come
    /// from the config file when set.
    pub fn resolve(data_dir: Option<String>, file_cfg: &KubesegConfigFile) -> Self {
        let dir = PathBuf::from(
            data_dir
                .or_else(|| file_cfg.data_dir.clone())
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );
        let pick = |name: &Option<String>, default: &str| {
            dir.join(name.as_deref().unwrap_or(default))
        };
        Self {
            flows: pick(&file_cfg.flows_file, FLOWS_FILE),
            policies: pick(&file_cfg.policies_file, POLICIES_FILE),
            intents: pick(&file_cfg.intents_file, INTENTS_FILE),
        }
    }
}

/// An explicit snapshot of the loaded input. Callers pass it into the
/// analysis functions and call [`Dataset::reload`] to pick up changes on
/// disk; there is no hidden cache.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub flows: Vec<Flow>,
    pub policies: Vec<NetworkPolicy>,
    pub intents: Vec<IntentRule>,
}

impl Dataset {
    /// Load all three files. A missing file yields an empty list; a file that
    /// exists but fails to parse or validate is an error.
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let flows = read_optional(&paths.flows)?
            .map(|content| parse_flows(&content))
            .transpose()
            .with_context(|| format!("loading flows from {}", paths.flows.display()))?
            .unwrap_or_default();
        let policies = read_optional(&paths.policies)?
            .map(|content| parse_policies(&content))
            .transpose()
            .with_context(|| format!("loading policies from {}", paths.policies.display()))?
            .unwrap_or_default();
        let intents = read_optional(&paths.intents)?
            .map(|content| parse_intents(&content))
            .transpose()
            .with_context(|| format!("loading intents from {}", paths.intents.display()))?
            .unwrap_or_default();

        info!(
            "Loaded {} flows, {} policies, {} intents",
            flows.len(),
            policies.len(),
            intents.len()
        );
        Ok(Self {
            flows,
            policies,
            intents,
        })
    }

    /// Replace this snapshot with a fresh load. On error the current
    /// contents are kept.
    pub fn reload(&mut self, paths: &DataPaths) -> Result<()> {
        *self = Self::load(paths)?;
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, treating as empty", path.display());
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOWS: &str = r#"[
  {"src_ns": "dev", "src_pod": "web-1", "src_labels": {"app": "web"},
   "dst_ns": "prod", "dst_pod": "db-0", "dst_labels": {"role": "db"},
   "port": 5432, "protocol": "TCP", "verdict": "allow"}
]"#;

    const POLICIES: &str = r#"
- name: db-allow-api
  namespace: prod
  pod_selector:
    role: db
  ingress:
    - from_pod_selectors:
        - match_labels:
            app: api
      ports:
        - port: 5432
          protocol: TCP
"#;

    const INTENTS: &str = r#"
- id: api-to-db
  src_selector:
    app: api
  dst_selector:
    role: db
  allowed_ports:
    - port: 5432
      protocol: TCP
  description: API reads the database
"#;

    fn write_dataset(dir: &Path) {
        std::fs::write(dir.join(FLOWS_FILE), FLOWS).unwrap();
        std::fs::write(dir.join(POLICIES_FILE), POLICIES).unwrap();
        std::fs::write(dir.join(INTENTS_FILE), INTENTS).unwrap();
    }

    #[test]
    fn loads_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());

        let data = Dataset::load(&DataPaths::in_dir(dir.path())).unwrap();
        assert_eq!(data.flows.len(), 1);
        assert_eq!(data.flows[0].dst_pod, "db-0");
        assert_eq!(data.policies.len(), 1);
        assert_eq!(data.policies[0].ingress[0].ports[0].port, 5432);
        assert_eq!(data.intents.len(), 1);
        assert_eq!(data.intents[0].namespace, None);
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = Dataset::load(&DataPaths::in_dir(dir.path())).unwrap();
        assert!(data.flows.is_empty());
        assert!(data.policies.is_empty());
        assert!(data.intents.is_empty());
    }

    #[test]
    fn invalid_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        std::fs::write(dir.path().join(POLICIES_FILE), "- name: Bad_Name\n  namespace: prod\n").unwrap();

        let err = Dataset::load(&DataPaths::in_dir(dir.path())).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains(POLICIES_FILE), "unexpected error: {}", msg);
        assert!(msg.contains("Bad_Name"), "unexpected error: {}", msg);
    }

    #[test]
    fn reload_picks_up_changes_and_keeps_state_on_error() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        let paths = DataPaths::in_dir(dir.path());
        let mut data = Dataset::load(&paths).unwrap();

        std::fs::write(dir.path().join(INTENTS_FILE), "[]").unwrap();
        data.reload(&paths).unwrap();
        assert!(data.intents.is_empty());
        assert_eq!(data.flows.len(), 1);

        std::fs::write(dir.path().join(FLOWS_FILE), "not json").unwrap();
        assert!(data.reload(&paths).is_err());
        assert_eq!(data.flows.len(), 1, "failed reload keeps the previous snapshot");
    }

    #[test]
    fn resolve_prefers_explicit_dir_then_config() {
        let file_cfg = KubesegConfigFile {
            data_dir: Some("/srv/kubeseg".to_string()),
            flows_file: Some("hubble.jsonl".to_string()),
            ..Default::default()
        };

        let paths = DataPaths::resolve(None, &file_cfg);
        assert_eq!(paths.flows, PathBuf::from("/srv/kubeseg/hubble.jsonl"));
        assert_eq!(paths.policies, PathBuf::from("/srv/kubeseg").join(POLICIES_FILE));

        let paths = DataPaths::resolve(Some("/tmp/data".to_string()), &file_cfg);
        assert_eq!(paths.flows, PathBuf::from("/tmp/data/hubble.jsonl"));

        let paths = DataPaths::resolve(None, &KubesegConfigFile::default());
        assert_eq!(paths, DataPaths::in_dir(DEFAULT_DATA_DIR));
    }
}
