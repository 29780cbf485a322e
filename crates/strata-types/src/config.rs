//! CLI configuration types.
//!
//! `CliConfig` represents `strata.toml` in the configuration directory. All
//! fields have defaults so an absent or partial file is valid.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration handed to every command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub journal: JournalConfig,

    #[serde(default)]
    pub backup: BackupConfig,
}

/// Where the cluster's primary master lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_cluster_name")]
    pub name: String,

    #[serde(default = "default_master_hostname")]
    pub master_hostname: String,

    #[serde(default = "default_master_rpc_port")]
    pub master_rpc_port: u16,
}

fn default_cluster_name() -> String {
    "strata".to_string()
}

fn default_master_hostname() -> String {
    "localhost".to_string()
}

fn default_master_rpc_port() -> u16 {
    19998
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: default_cluster_name(),
            master_hostname: default_master_hostname(),
            master_rpc_port: default_master_rpc_port(),
        }
    }
}

/// How the master journal is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalType {
    /// Journal segments on a local or mounted filesystem.
    #[default]
    Local,
    /// Journal replicated among masters through the embedded consensus log.
    Embedded,
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Journal folder; relative paths resolve against the config directory.
    #[serde(default = "default_journal_folder")]
    pub folder: PathBuf,

    #[serde(default, rename = "type")]
    pub journal_type: JournalType,
}

fn default_journal_folder() -> PathBuf {
    PathBuf::from("journal")
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            folder: default_journal_folder(),
            journal_type: JournalType::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Where `journal backup` writes by default; relative to the config directory.
    #[serde(default = "default_backup_directory")]
    pub directory: PathBuf,
}

fn default_backup_directory() -> PathBuf {
    PathBuf::from("backups")
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: default_backup_directory(),
        }
    }
}

impl CliConfig {
    /// Join every relative path in the config onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.journal.folder.is_relative() {
            self.journal.folder = base.join(&self.journal.folder);
        }
        if self.backup.directory.is_relative() {
            self.backup.directory = base.join(&self.backup.directory);
        }
    }

    /// Flatten the config into dotted `(key, value)` pairs, sorted by key.
    pub fn to_pairs(&self) -> Result<Vec<(String, String)>, ConfigError> {
        let value =
            toml::Value::try_from(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        let mut pairs = Vec::new();
        flatten("", &value, &mut pairs);
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(pairs)
    }

    /// Look up one dotted key, e.g. `journal.folder`.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        self.to_pairs()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }
}

fn flatten(prefix: &str, value: &toml::Value, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config_default_values() {
        let config = CliConfig::default();
        assert_eq!(config.cluster.name, "strata");
        assert_eq!(config.cluster.master_hostname, "localhost");
        assert_eq!(config.cluster.master_rpc_port, 19998);
        assert_eq!(config.journal.folder, PathBuf::from("journal"));
        assert_eq!(config.journal.journal_type, JournalType::Local);
        assert_eq!(config.backup.directory, PathBuf::from("backups"));
    }

    #[test]
    fn test_cli_config_deserialize_empty() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_cli_config_deserialize_with_values() {
        let toml_str = r#"
[cluster]
name = "prod"
master_rpc_port = 29998

[journal]
folder = "/var/lib/strata/journal"
type = "embedded"
"#;
        let config: CliConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cluster.name, "prod");
        assert_eq!(config.cluster.master_hostname, "localhost");
        assert_eq!(config.cluster.master_rpc_port, 29998);
        assert_eq!(
            config.journal.folder,
            PathBuf::from("/var/lib/strata/journal")
        );
        assert_eq!(config.journal.journal_type, JournalType::Embedded);
    }

    #[test]
    fn test_cli_config_rejects_unknown_journal_type() {
        let result: Result<CliConfig, _> = toml::from_str("[journal]\ntype = \"tape\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths_only_touches_relative() {
        let mut config = CliConfig::default();
        config.backup.directory = PathBuf::from("/mnt/backups");
        config.resolve_paths(Path::new("/etc/strata"));
        assert_eq!(config.journal.folder, PathBuf::from("/etc/strata/journal"));
        assert_eq!(config.backup.directory, PathBuf::from("/mnt/backups"));
    }

    #[test]
    fn test_to_pairs_sorted_dotted_keys() {
        let pairs = CliConfig::default().to_pairs().unwrap();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "backup.directory",
                "cluster.master_hostname",
                "cluster.master_rpc_port",
                "cluster.name",
                "journal.folder",
                "journal.type",
            ]
        );
    }

    #[test]
    fn test_get_key() {
        let config = CliConfig::default();
        assert_eq!(config.get("cluster.master_rpc_port").unwrap(), "19998");
        assert_eq!(config.get("journal.type").unwrap(), "local");
        assert!(matches!(
            config.get("journal.nope"),
            Err(ConfigError::UnknownKey(k)) if k == "journal.nope"
        ));
    }
}
