//! Configuration management for emo-analyzer
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--config`, `--log-level`, `--jobs`)
//! 2. Environment variables (`EMO_CONFIG`, `EMO_CONVERTER_PROGRAM`, `EMO_LOG_LEVEL`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing default configuration file is not an error. A missing file that
//! was named explicitly is.

use crate::extraction::strategy::DecodeStrategy;
use crate::scoring::{ConfidenceCalibration, RuleTable};
use emo_common::config::{env_override, load_or_default, resolve_config_path, LoggingConfig};
use emo_common::{Error, FeatureDefaults, FeatureName, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "EMO_CONFIG";

/// Environment variable overriding `[converter].program`
pub const CONVERTER_PROGRAM_ENV_VAR: &str = "EMO_CONVERTER_PROGRAM";

/// Environment variable overriding `[logging].level`
pub const LOG_LEVEL_ENV_VAR: &str = "EMO_LOG_LEVEL";

/// Configuration file name inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "emo-analyzer.toml";

/// Complete analyzer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub logging: LoggingConfig,
    pub extraction: ExtractionConfig,
    pub converter: ConverterConfig,
    pub limits: LimitsConfig,
    pub scoring: ScoringConfig,
}

/// Decoding and feature extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Analysis sample rate in Hz
    #[serde(default = "default_target_sample_rate")]
    pub target_sample_rate: u32,

    /// Maximum analysed window in seconds
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: f64,

    /// Decoder strategies in priority order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<DecodeStrategy>,

    /// Declared extensions routed through the format converter
    #[serde(default = "default_hostile_extensions")]
    pub hostile_extensions: Vec<String>,

    /// Header bytes inspected by the byte heuristic
    #[serde(default = "default_header_window_bytes")]
    pub header_window_bytes: usize,

    /// Per-feature overrides of the default substitution table
    #[serde(default)]
    pub feature_defaults: BTreeMap<FeatureName, f64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: default_target_sample_rate(),
            max_duration_secs: default_max_duration_secs(),
            strategies: default_strategies(),
            hostile_extensions: default_hostile_extensions(),
            header_window_bytes: default_header_window_bytes(),
            feature_defaults: BTreeMap::new(),
        }
    }
}

impl ExtractionConfig {
    /// Default substitution table with configured overrides applied
    pub fn feature_defaults(&self) -> FeatureDefaults {
        self.feature_defaults
            .iter()
            .fold(FeatureDefaults::default(), |defaults, (&name, &value)| {
                defaults.with(name, value)
            })
    }

    /// True when a declared extension names a streaming container
    pub fn is_hostile_extension(&self, ext: &str) -> bool {
        self.hostile_extensions
            .iter()
            .any(|h| h.eq_ignore_ascii_case(ext))
    }
}

/// External format converter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Disable to skip the converted-decode strategy entirely
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Converter executable (name on PATH or absolute path)
    #[serde(default = "default_converter_program")]
    pub program: PathBuf,

    /// Hard time limit per conversion, seconds
    #[serde(default = "default_converter_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_converter_program(),
            timeout_secs: default_converter_timeout_secs(),
        }
    }
}

impl ConverterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Input limits enforced by the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted payload in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// Concurrent analyses in batch mode
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

/// Scoring rules and confidence calibration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub rules: RuleTable,
    pub calibration: ConfidenceCalibration,
}

fn default_target_sample_rate() -> u32 {
    22050
}

fn default_max_duration_secs() -> f64 {
    60.0
}

fn default_strategies() -> Vec<DecodeStrategy> {
    DecodeStrategy::DEFAULT_CHAIN.to_vec()
}

fn default_hostile_extensions() -> Vec<String> {
    ["webm", "weba", "mka", "mkv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_header_window_bytes() -> usize {
    1024
}

fn default_true() -> bool {
    true
}

fn default_converter_program() -> PathBuf {
    PathBuf::from(crate::transcoder::DEFAULT_PROGRAM)
}

fn default_converter_timeout_secs() -> u64 {
    30
}

fn default_max_input_bytes() -> u64 {
    32 * 1024 * 1024
}

fn default_max_concurrent_jobs() -> usize {
    4
}

impl AnalyzerConfig {
    /// Resolve, load, override from environment and validate
    ///
    /// # Arguments
    /// * `cli_path` - `--config` argument, if given
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let location = resolve_config_path(cli_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME);
        let mut config: AnalyzerConfig = load_or_default(location.as_ref())?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text (no environment overrides)
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalyzerConfig =
            toml::from_str(text).map_err(|e| Error::Config(format!("Parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `EMO_CONVERTER_PROGRAM` and `EMO_LOG_LEVEL`
    pub fn apply_env_overrides(&mut self) {
        if let Some(program) = env_override(CONVERTER_PROGRAM_ENV_VAR) {
            self.converter.program = PathBuf::from(program);
        }
        if let Some(level) = env_override(LOG_LEVEL_ENV_VAR) {
            self.logging.level = level;
        }
    }

    /// Reject values no analysis could run with
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        if extraction.target_sample_rate == 0 {
            return Err(Error::Config(
                "extraction.target_sample_rate must be positive".to_string(),
            ));
        }
        if !(extraction.max_duration_secs.is_finite() && extraction.max_duration_secs > 0.0) {
            return Err(Error::Config(format!(
                "extraction.max_duration_secs must be positive, got {}",
                extraction.max_duration_secs
            )));
        }
        if extraction.header_window_bytes == 0 {
            return Err(Error::Config(
                "extraction.header_window_bytes must be positive".to_string(),
            ));
        }
        for (i, strategy) in extraction.strategies.iter().enumerate() {
            if extraction.strategies[..i].contains(strategy) {
                return Err(Error::Config(format!(
                    "extraction.strategies lists {} twice",
                    strategy
                )));
            }
        }
        if let Some((name, value)) = extraction
            .feature_defaults
            .iter()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(Error::Config(format!(
                "extraction.feature_defaults.{} must be finite, got {}",
                name, value
            )));
        }
        if self.converter.timeout_secs == 0 {
            return Err(Error::Config(
                "converter.timeout_secs must be positive".to_string(),
            ));
        }
        if self.limits.max_input_bytes == 0 || self.limits.max_concurrent_jobs == 0 {
            return Err(Error::Config(
                "limits.max_input_bytes and limits.max_concurrent_jobs must be positive"
                    .to_string(),
            ));
        }
        self.scoring
            .rules
            .validate()
            .map_err(|e| Error::Config(format!("scoring.rules: {}", e)))?;
        self.scoring
            .calibration
            .validate()
            .map_err(|e| Error::Config(format!("scoring.calibration: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.extraction.target_sample_rate, 22050);
        assert_eq!(config.extraction.max_duration_secs, 60.0);
        assert_eq!(config.extraction.strategies, DecodeStrategy::DEFAULT_CHAIN.to_vec());
        assert!(config.extraction.is_hostile_extension("WEBM"));
        assert!(!config.extraction.is_hostile_extension("wav"));
        assert_eq!(config.limits.max_input_bytes, 32 * 1024 * 1024);
        assert_eq!(config.converter.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
            [extraction]
            max_duration_secs = 20.0
            strategies = ["direct", "alternate"]

            [extraction.feature_defaults]
            tempo = 100.0

            [converter]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.max_duration_secs, 20.0);
        assert_eq!(config.extraction.target_sample_rate, 22050);
        assert_eq!(config.extraction.strategies.len(), 2);
        assert_eq!(config.extraction.feature_defaults().get(FeatureName::Tempo), 100.0);
        assert_eq!(config.extraction.feature_defaults().get(FeatureName::RmsEnergy), 0.1);
        assert!(!config.converter.enabled);
        assert_eq!(config.converter.program, PathBuf::from("ffmpeg"));
        assert_eq!(config.scoring.rules, RuleTable::default());
    }

    #[test]
    fn test_validation_rejects_nonsense() {
        let cases = [
            "[extraction]\ntarget_sample_rate = 0",
            "[extraction]\nmax_duration_secs = -1.0",
            "[extraction]\nstrategies = [\"direct\", \"direct\"]",
            "[converter]\ntimeout_secs = 0",
            "[limits]\nmax_concurrent_jobs = 0",
            "[scoring.calibration.acoustic]\nbase = 70.0\nfloor = 96.0\nceiling = 95.0",
            "[scoring.rules]\nneutral_base = 0.0",
        ];
        for case in cases {
            assert!(
                AnalyzerConfig::from_toml_str(case).is_err(),
                "accepted: {}",
                case
            );
        }
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(AnalyzerConfig::from_toml_str("[extraction]\nstrategies = [\"magic\"]").is_err());
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let text = toml::to_string(&AnalyzerConfig::default()).unwrap();
        let parsed = AnalyzerConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, AnalyzerConfig::default());
    }
}
