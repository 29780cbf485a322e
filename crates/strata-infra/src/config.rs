//! CLI configuration loader.
//!
//! Reads `strata.toml` from the configuration directory and deserializes it
//! into [`CliConfig`]. A missing file means defaults; a malformed file is an
//! error, since commands like `journal format` must never act on a guessed
//! journal folder.

use std::path::{Path, PathBuf};

use strata_types::config::CliConfig;
use strata_types::error::ConfigError;

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE: &str = "strata.toml";

/// Environment variable overriding the configuration directory.
pub const CONF_DIR_ENV: &str = "STRATA_CONF_DIR";

/// Configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CliConfig,
    pub conf_dir: PathBuf,
    /// The file that was parsed; `None` when defaults were used.
    pub source: Option<PathBuf>,
}

/// Resolve the configuration directory.
///
/// Priority:
/// 1. Explicit path (the `--conf-dir` flag)
/// 2. `STRATA_CONF_DIR` environment variable
/// 3. `~/.strata`
/// 4. `./.strata`
pub fn resolve_conf_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }

    if let Ok(dir) = std::env::var(CONF_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".strata");
    }

    PathBuf::from(".strata")
}

/// Load `{conf_dir}/strata.toml`.
///
/// Relative paths inside the file resolve against `conf_dir`.
pub async fn load_config(conf_dir: &Path) -> Result<LoadedConfig, ConfigError> {
    let config_path = conf_dir.join(CONFIG_FILE);

    let (mut config, source) = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => {
            let config = toml::from_str::<CliConfig>(&content).map_err(|e| ConfigError::Parse {
                path: config_path.clone(),
                message: e.message().to_string(),
            })?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            (config, Some(config_path))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No {CONFIG_FILE} found at {}, using defaults",
                conf_dir.display()
            );
            (CliConfig::default(), None)
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            });
        }
    };

    config.resolve_paths(conf_dir);

    Ok(LoadedConfig {
        config,
        conf_dir: conf_dir.to_path_buf(),
        source,
    })
}
