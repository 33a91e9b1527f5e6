//! Configuration System
//!
//! Analysis parameters are loaded from a TOML file with environment variable
//! overrides. Every threshold the analyzers use lives here so results can be
//! tuned without code changes.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub phases: PhaseConfig,

    #[serde(default)]
    pub correlation: CorrelationConfig,

    #[serde(default)]
    pub trends: TrendConfig,

    #[serde(default)]
    pub patterns: PatternConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Phase boundary parameters
///
/// Fractions are of the cycle length and must increase:
/// menstrual < early follicular < ovulatory, with the pre-menstrual fraction
/// counted back from the end of the cycle.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PhaseConfig {
    /// Length assumed for the most recent cycle when no successor exists
    #[serde(default = "default_assumed_length")]
    pub assumed_cycle_length_days: u32,

    #[serde(default = "default_menstrual_fraction")]
    pub menstrual_fraction: f64,

    #[serde(default = "default_min_menstrual_days")]
    pub min_menstrual_days: u32,

    #[serde(default = "default_early_follicular_fraction")]
    pub early_follicular_fraction: f64,

    #[serde(default = "default_ovulatory_fraction")]
    pub ovulatory_fraction: f64,

    #[serde(default = "default_pre_menstrual_fraction")]
    pub pre_menstrual_fraction: f64,
}

fn default_assumed_length() -> u32 {
    28
}

fn default_menstrual_fraction() -> f64 {
    0.18
}

fn default_min_menstrual_days() -> u32 {
    3
}

fn default_early_follicular_fraction() -> f64 {
    0.40
}

fn default_ovulatory_fraction() -> f64 {
    0.55
}

fn default_pre_menstrual_fraction() -> f64 {
    0.10
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            assumed_cycle_length_days: default_assumed_length(),
            menstrual_fraction: default_menstrual_fraction(),
            min_menstrual_days: default_min_menstrual_days(),
            early_follicular_fraction: default_early_follicular_fraction(),
            ovulatory_fraction: default_ovulatory_fraction(),
            pre_menstrual_fraction: default_pre_menstrual_fraction(),
        }
    }
}

/// Symptom/phase correlation parameters
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CorrelationConfig {
    #[serde(default = "default_correlation_window")]
    pub window_months: u32,

    /// Distinct cycles that must overlap the window
    #[serde(default = "default_min_cycles")]
    pub min_cycles: usize,
}

fn default_correlation_window() -> u32 {
    3
}

fn default_min_cycles() -> usize {
    2
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            window_months: default_correlation_window(),
            min_cycles: default_min_cycles(),
        }
    }
}

/// Intensity trend parameters
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrendConfig {
    #[serde(default = "default_trend_window")]
    pub window_days: u32,

    #[serde(default = "default_bucket_days")]
    pub bucket_days: u32,

    /// Minimum |slope| in intensity points per week to call a trend
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold: f64,
}

fn default_trend_window() -> u32 {
    90
}

fn default_bucket_days() -> u32 {
    7
}

fn default_slope_threshold() -> f64 {
    0.15
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_days: default_trend_window(),
            bucket_days: default_bucket_days(),
            slope_threshold: default_slope_threshold(),
        }
    }
}

/// Recurring pattern parameters
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PatternConfig {
    #[serde(default = "default_min_occurrences")]
    pub min_occurrences: usize,

    #[serde(default = "default_min_distinct_cycles")]
    pub min_distinct_cycles: usize,
}

fn default_min_occurrences() -> usize {
    2
}

fn default_min_distinct_cycles() -> usize {
    2
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_occurrences: default_min_occurrences(),
            min_distinct_cycles: default_min_distinct_cycles(),
        }
    }
}

/// Cycle forecast parameters
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ForecastConfig {
    /// Length used to seed a prediction from a single closed cycle
    #[serde(default = "default_fallback_length")]
    pub fallback_cycle_length_days: u32,

    /// Multiplier applied to the coefficient of variation in the regularity score
    #[serde(default = "default_regularity_scale")]
    pub regularity_scale: f64,
}

fn default_fallback_length() -> u32 {
    28
}

fn default_regularity_scale() -> f64 {
    2.0
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            fallback_cycle_length_days: default_fallback_length(),
            regularity_scale: default_regularity_scale(),
        }
    }
}

/// Symptom summary parameters
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SummaryConfig {
    #[serde(default = "default_summary_window")]
    pub window_days: u32,
}

fn default_summary_window() -> u32 {
    30
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            window_days: default_summary_window(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    ///
    /// Overrides that leave the config invalid are discarded with a warning.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();

        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Ignoring environment overrides: {}", e);
                Config::default()
            }
        }
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("cadence").join("config.toml")),
            Some(PathBuf::from("/etc/cadence/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.phases;
        let fractions = [
            ("phases.menstrual_fraction", p.menstrual_fraction),
            ("phases.early_follicular_fraction", p.early_follicular_fraction),
            ("phases.ovulatory_fraction", p.ovulatory_fraction),
            ("phases.pre_menstrual_fraction", p.pre_menstrual_fraction),
        ];
        for (name, value) in fractions {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if !(p.menstrual_fraction < p.early_follicular_fraction
            && p.early_follicular_fraction < p.ovulatory_fraction
            && p.ovulatory_fraction < 1.0 - p.pre_menstrual_fraction)
        {
            return Err(ConfigError::Invalid(
                "phase fractions must increase: menstrual < early_follicular < ovulatory < 1 - pre_menstrual"
                    .to_string(),
            ));
        }

        if p.assumed_cycle_length_days == 0 {
            return Err(ConfigError::Invalid(
                "phases.assumed_cycle_length_days must be positive".to_string(),
            ));
        }

        if self.trends.bucket_days == 0 {
            return Err(ConfigError::Invalid(
                "trends.bucket_days must be positive".to_string(),
            ));
        }

        if self.trends.slope_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "trends.slope_threshold must not be negative".to_string(),
            ));
        }

        if self.forecast.fallback_cycle_length_days == 0 {
            return Err(ConfigError::Invalid(
                "forecast.fallback_cycle_length_days must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Some(days) = env_parse("CADENCE_ASSUMED_CYCLE_LENGTH") {
            self.phases.assumed_cycle_length_days = days;
        }

        if let Some(months) = env_parse("CADENCE_CORRELATION_WINDOW_MONTHS") {
            self.correlation.window_months = months;
        }

        if let Some(days) = env_parse("CADENCE_TREND_WINDOW_DAYS") {
            self.trends.window_days = days;
        }

        if let Some(min) = env_parse("CADENCE_MIN_OCCURRENCES") {
            self.patterns.min_occurrences = min;
        }

        if let Ok(level) = std::env::var("CADENCE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CADENCE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring {}: cannot parse {:?}", key, value);
            None
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Cadence Configuration
#
# Environment variables override these settings:
# - CADENCE_ASSUMED_CYCLE_LENGTH
# - CADENCE_CORRELATION_WINDOW_MONTHS
# - CADENCE_TREND_WINDOW_DAYS
# - CADENCE_MIN_OCCURRENCES
# - CADENCE_LOG_LEVEL
# - CADENCE_LOG_FORMAT

[phases]
# Length assumed for the latest cycle when no later cycle is recorded (days)
assumed_cycle_length_days = 28

# Phase boundaries as fractions of the cycle length
menstrual_fraction = 0.18
min_menstrual_days = 3
early_follicular_fraction = 0.40
ovulatory_fraction = 0.55

# Counted back from the end of the cycle
pre_menstrual_fraction = 0.10

[correlation]
# How far back to look (months)
window_months = 3

# Distinct cycles required inside the window
min_cycles = 2

[trends]
# How far back to look (days)
window_days = 90

# Bucket width for the per-bucket mean intensity (days)
bucket_days = 7

# Slope (intensity points per week) above which a trend is reported
slope_threshold = 0.15

[patterns]
# Minimum occurrences of a symptom in the same phase
min_occurrences = 2

# Minimum distinct cycles the occurrences must span
min_distinct_cycles = 2

[forecast]
# Cycle length used when only one closed cycle is known (days)
fallback_cycle_length_days = 28

# Regularity score = 100 - (stddev / mean) * 100 * regularity_scale
regularity_scale = 2.0

[summary]
# Symptom summary window (days)
window_days = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.phases.assumed_cycle_length_days, 28);
        assert_eq!(config.phases.menstrual_fraction, 0.18);
        assert_eq!(config.phases.min_menstrual_days, 3);
        assert_eq!(config.correlation.window_months, 3);
        assert_eq!(config.trends.bucket_days, 7);
        assert_eq!(config.trends.slope_threshold, 0.15);
        assert_eq!(config.patterns.min_occurrences, 2);
        assert_eq!(config.forecast.regularity_scale, 2.0);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_matches_defaults() {
        let parsed: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[trends]\nwindow_days = 60\n\n[patterns]\nmin_occurrences = 3"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.trends.window_days, 60);
        assert_eq!(config.trends.bucket_days, 7);
        assert_eq!(config.patterns.min_occurrences, 3);
        assert_eq!(config.phases, PhaseConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[phases\nassumed = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_rejects_unordered_fractions() {
        let mut config = Config::default();
        config.phases.ovulatory_fraction = 0.30;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.phases.pre_menstrual_fraction = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.trends.bucket_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_rejected_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[phases]\nmenstrual_fraction = 0.5").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    /// Serialises tests that touch process environment variables
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const ENV_KEYS: [&str; 6] = [
        "CADENCE_ASSUMED_CYCLE_LENGTH",
        "CADENCE_CORRELATION_WINDOW_MONTHS",
        "CADENCE_TREND_WINDOW_DAYS",
        "CADENCE_MIN_OCCURRENCES",
        "CADENCE_LOG_LEVEL",
        "CADENCE_LOG_FORMAT",
    ];

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = f();
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_from_env_applies_overrides() {
        let config = with_env(
            &[
                ("CADENCE_ASSUMED_CYCLE_LENGTH", "30"),
                ("CADENCE_CORRELATION_WINDOW_MONTHS", "6"),
                ("CADENCE_TREND_WINDOW_DAYS", "120"),
                ("CADENCE_MIN_OCCURRENCES", "4"),
                ("CADENCE_LOG_FORMAT", "json"),
            ],
            Config::from_env,
        );

        assert_eq!(config.phases.assumed_cycle_length_days, 30);
        assert_eq!(config.correlation.window_months, 6);
        assert_eq!(config.trends.window_days, 120);
        assert_eq!(config.patterns.min_occurrences, 4);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_from_env_ignores_unparseable_value() {
        let config = with_env(
            &[
                ("CADENCE_TREND_WINDOW_DAYS", "ninety"),
                ("CADENCE_MIN_OCCURRENCES", "5"),
            ],
            Config::from_env,
        );

        assert_eq!(config.trends.window_days, 90);
        assert_eq!(config.patterns.min_occurrences, 5);
    }

    #[test]
    fn test_from_env_rejects_invalid_override() {
        let config = with_env(&[("CADENCE_ASSUMED_CYCLE_LENGTH", "0")], Config::from_env);
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_with_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[trends]
window_days = 60
bucket_days = 14").unwrap();

        let config = with_env(&[("CADENCE_TREND_WINDOW_DAYS", "45")], || {
            Config::load_with_env(file.path()).unwrap()
        });
        assert_eq!(config.trends.window_days, 45);
        assert_eq!(config.trends.bucket_days, 14);
    }

    #[test]
    fn test_load_with_env_rejects_invalid_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[trends]
window_days = 60").unwrap();

        let err = with_env(&[("CADENCE_ASSUMED_CYCLE_LENGTH", "0")], || {
            Config::load_with_env(file.path()).unwrap_err()
        });
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
