//! Configuration file resolution and shared configuration sections
//!
//! Priority order for locating a TOML configuration file:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config dir>/emo/<file name>`)
//! 4. None: callers fall back to compiled defaults
//!
//! A file named explicitly (CLI or environment) must exist. The platform
//! default file is optional.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Where a configuration file path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    PlatformDefault,
}

/// A located configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub source: ConfigSource,
}

impl ConfigLocation {
    /// Whether a missing file at this location is an error
    pub fn is_required(&self) -> bool {
        !matches!(self.source, ConfigSource::PlatformDefault)
    }
}

/// Resolve the configuration file location
///
/// # Arguments
/// * `cli_arg` - Path given on the command line, if any
/// * `env_var_name` - Environment variable holding a path
/// * `file_name` - File name inside the platform config directory
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
) -> Option<ConfigLocation> {
    if let Some(path) = cli_arg {
        return Some(ConfigLocation {
            path: path.to_path_buf(),
            source: ConfigSource::CommandLine,
        });
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(ConfigLocation {
                path: PathBuf::from(path),
                source: ConfigSource::Environment,
            });
        }
    }

    dirs::config_dir().map(|dir| ConfigLocation {
        path: dir.join("emo").join(file_name),
        source: ConfigSource::PlatformDefault,
    })
}

/// Parse a TOML configuration file
pub fn read_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load configuration from a resolved location, degrading to defaults
///
/// - No location, or optional location missing → warning + `T::default()`
/// - Required location missing → `Error::Config`
/// - File present but malformed → `Error::Config`
pub fn load_or_default<T>(location: Option<&ConfigLocation>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(location) = location else {
        warn!("No configuration directory available, using built-in defaults");
        return Ok(T::default());
    };

    if !location.path.exists() {
        if location.is_required() {
            return Err(Error::Config(format!(
                "Configuration file not found: {}",
                location.path.display()
            )));
        }
        warn!(
            "Configuration file not found at {}, using built-in defaults",
            location.path.display()
        );
        return Ok(T::default());
    }

    let config = read_toml_file(&location.path)?;
    info!("Configuration loaded from {}", location.path.display());
    Ok(config)
}

/// Read an environment override, ignoring empty values
pub fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "info");
        assert!(logging.file.is_none());
    }

    #[test]
    fn test_cli_argument_wins() {
        let location =
            resolve_config_path(Some(Path::new("/tmp/custom.toml")), "EMO_UNUSED_VAR", "x.toml")
                .unwrap();
        assert_eq!(location.source, ConfigSource::CommandLine);
        assert_eq!(location.path, PathBuf::from("/tmp/custom.toml"));
        assert!(location.is_required());
    }

    #[test]
    fn test_logging_section_parses_partially() {
        let logging: LoggingConfig = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(logging.level, "debug");
        assert!(logging.file.is_none());
    }
}
