//! Tests for configuration file resolution and graceful degradation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate EMO_TEST_CONFIG are marked with #[serial].

use emo_common::config::{
    env_override, load_or_default, read_toml_file, resolve_config_path, ConfigLocation,
    ConfigSource, LoggingConfig,
};
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

const TEST_ENV_VAR: &str = "EMO_TEST_CONFIG";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct SampleConfig {
    logging: LoggingConfig,
    name: Option<String>,
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_argument() {
    env::set_var(TEST_ENV_VAR, "/tmp/emo-env.toml");

    let location = resolve_config_path(None, TEST_ENV_VAR, "emo-analyzer.toml").unwrap();
    assert_eq!(location.source, ConfigSource::Environment);
    assert_eq!(location.path, PathBuf::from("/tmp/emo-env.toml"));
    assert!(location.is_required());

    env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_argument_beats_env_var() {
    env::set_var(TEST_ENV_VAR, "/tmp/emo-env.toml");

    let location = resolve_config_path(
        Some(Path::new("/tmp/emo-cli.toml")),
        TEST_ENV_VAR,
        "emo-analyzer.toml",
    )
    .unwrap();
    assert_eq!(location.source, ConfigSource::CommandLine);
    assert_eq!(location.path, PathBuf::from("/tmp/emo-cli.toml"));

    env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_empty_env_var_falls_through_to_platform_default() {
    env::set_var(TEST_ENV_VAR, "   ");

    if let Some(location) = resolve_config_path(None, TEST_ENV_VAR, "emo-analyzer.toml") {
        assert_eq!(location.source, ConfigSource::PlatformDefault);
        assert!(location.path.ends_with("emo/emo-analyzer.toml"));
        assert!(!location.is_required());
    }

    env::remove_var(TEST_ENV_VAR);
}

#[test]
fn test_missing_optional_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let location = ConfigLocation {
        path: dir.path().join("absent.toml"),
        source: ConfigSource::PlatformDefault,
    };

    let config: SampleConfig = load_or_default(Some(&location)).unwrap();
    assert_eq!(config, SampleConfig::default());
}

#[test]
fn test_missing_required_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let location = ConfigLocation {
        path: dir.path().join("absent.toml"),
        source: ConfigSource::CommandLine,
    };

    let result: emo_common::Result<SampleConfig> = load_or_default(Some(&location));
    assert!(result.is_err());
}

#[test]
fn test_no_location_yields_defaults() {
    let config: SampleConfig = load_or_default(None).unwrap();
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_file_is_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emo.toml");
    std::fs::write(
        &path,
        "name = \"bench\"\n\n[logging]\nlevel = \"debug\"\nfile = \"/tmp/emo.log\"\n",
    )
    .unwrap();

    let config: SampleConfig = read_toml_file(&path).unwrap();
    assert_eq!(config.name.as_deref(), Some("bench"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/emo.log")));
}

#[test]
fn test_malformed_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[logging\nlevel = ").unwrap();

    let location = ConfigLocation {
        path,
        source: ConfigSource::PlatformDefault,
    };
    let result: emo_common::Result<SampleConfig> = load_or_default(Some(&location));
    assert!(matches!(result, Err(emo_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_env_override_trims_and_ignores_empty() {
    env::set_var(TEST_ENV_VAR, "  warn ");
    assert_eq!(env_override(TEST_ENV_VAR).as_deref(), Some("warn"));

    env::set_var(TEST_ENV_VAR, "");
    assert_eq!(env_override(TEST_ENV_VAR), None);

    env::remove_var(TEST_ENV_VAR);
    assert_eq!(env_override(TEST_ENV_VAR), None);
}
