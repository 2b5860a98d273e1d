//! Run configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with KVANT_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{SimError, SimResult};
use crate::kernel::KernelPath;
use crate::result::BitOrder;

/// Widest register any configuration may allow.
pub const ABSOLUTE_MAX_QUBITS: u32 = 32;

/// Settings for a [`crate::SimulationRun`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Shots when the caller does not name a count
    #[serde(default = "default_shots")]
    pub shots: u64,

    /// Seed for the random source; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Gate kernel: "scalar" or "vectorized"
    #[serde(default)]
    pub kernel: KernelPath,

    /// Bitstring convention of results
    #[serde(default)]
    pub bit_order: BitOrder,

    /// Largest register accepted
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,

    /// Largest classical register accepted
    #[serde(default = "default_max_clbits")]
    pub max_clbits: u32,

    /// Largest shot count accepted
    #[serde(default = "default_max_shots")]
    pub max_shots: u64,

    /// Components with |a| at or below this are left out of the final state
    #[serde(default = "default_amplitude_threshold")]
    pub amplitude_threshold: f64,

    /// State length from which the vectorized kernel goes multi-threaded
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Logging setup
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level ("trace" .. "error") or an `EnvFilter` directive list
    /// such as "info,kvant_sim=debug"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output.
    #[default]
    Console,
    /// JSON structured logging.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Console => f.write_str("console"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            other => Err(SimError::Configuration(format!("Invalid log format: {other}"))),
        }
    }
}

// Default value functions
fn default_shots() -> u64 {
    1
}

fn default_max_qubits() -> u32 {
    24
}

fn default_max_clbits() -> u32 {
    1024
}

fn default_max_shots() -> u64 {
    10_000_000
}

fn default_amplitude_threshold() -> f64 {
    1e-10
}

fn default_parallel_threshold() -> usize {
    1 << 14
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shots: default_shots(),
            seed: None,
            kernel: KernelPath::default(),
            bit_order: BitOrder::default(),
            max_qubits: default_max_qubits(),
            max_clbits: default_max_clbits(),
            max_shots: default_max_shots(),
            amplitude_threshold: default_amplitude_threshold(),
            parallel_threshold: default_parallel_threshold(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl SimulationConfig {
    /// Set the default shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    /// Fix the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Pick the kernel path.
    #[must_use]
    pub fn with_kernel(mut self, kernel: KernelPath) -> Self {
        self.kernel = kernel;
        self
    }

    /// Pick the bitstring convention.
    #[must_use]
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Set the largest accepted register.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set the largest accepted classical register.
    #[must_use]
    pub fn with_max_clbits(mut self, max_clbits: u32) -> Self {
        self.max_clbits = max_clbits;
        self
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(contents: &str) -> SimResult<Self> {
        let config: SimulationConfig =
            serde_yaml_ng::from_str(contents).map_err(|e| SimError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `KVANT_*` environment variables.
    pub fn from_env() -> SimResult<Self> {
        Self::default().apply_env()
    }

    /// Load with the following precedence:
    /// 1. Environment variable overrides
    /// 2. File, if provided
    /// 3. Defaults
    pub fn load(config_file: Option<&Path>) -> SimResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()
    }

    /// Override fields from `KVANT_*` environment variables.
    pub fn apply_env(self) -> SimResult<Self> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override fields from variables looked up through `lookup`.
    ///
    /// Only variables that are set override the current values. A set but
    /// unparsable value is an error rather than being ignored.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> SimResult<Self> {
        if let Some(v) = lookup("KVANT_SHOTS") {
            self.shots = parse_var("KVANT_SHOTS", &v)?;
        }
        if let Some(v) = lookup("KVANT_SEED") {
            self.seed = Some(parse_var("KVANT_SEED", &v)?);
        }
        if let Some(v) = lookup("KVANT_KERNEL") {
            self.kernel = v.parse()?;
        }
        if let Some(v) = lookup("KVANT_BIT_ORDER") {
            self.bit_order = v.parse()?;
        }
        if let Some(v) = lookup("KVANT_MAX_QUBITS") {
            self.max_qubits = parse_var("KVANT_MAX_QUBITS", &v)?;
        }
        if let Some(v) = lookup("KVANT_MAX_CLBITS") {
            self.max_clbits = parse_var("KVANT_MAX_CLBITS", &v)?;
        }
        if let Some(v) = lookup("KVANT_MAX_SHOTS") {
            self.max_shots = parse_var("KVANT_MAX_SHOTS", &v)?;
        }
        if let Some(v) = lookup("KVANT_AMPLITUDE_THRESHOLD") {
            self.amplitude_threshold = parse_var("KVANT_AMPLITUDE_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("KVANT_PARALLEL_THRESHOLD") {
            self.parallel_threshold = parse_var("KVANT_PARALLEL_THRESHOLD", &v)?;
        }

        // Logging
        if let Some(v) = lookup("KVANT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("KVANT_LOG_FORMAT") {
            self.logging.format = v.parse()?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> SimResult<()> {
        if self.max_qubits > ABSOLUTE_MAX_QUBITS {
            return Err(SimError::Configuration(format!(
                "max_qubits {} exceeds the limit of {ABSOLUTE_MAX_QUBITS}",
                self.max_qubits
            )));
        }

        if self.max_shots == 0 {
            return Err(SimError::Configuration(
                "max_shots must be greater than 0".to_string(),
            ));
        }

        if self.shots > self.max_shots {
            return Err(SimError::Configuration(format!(
                "shots {} exceeds max_shots {}",
                self.shots, self.max_shots
            )));
        }

        if !(0.0..1.0).contains(&self.amplitude_threshold) {
            return Err(SimError::Configuration(format!(
                "amplitude_threshold must lie in [0, 1), got {}",
                self.amplitude_threshold
            )));
        }

        validate_log_level(&self.logging.level)
    }
}

/// Accept a bare level or any directive list `EnvFilter` understands.
///
/// A single word without `=` must be a level name, so a misspelled level is
/// not silently taken as a target.
fn validate_log_level(level: &str) -> SimResult<()> {
    let invalid = |reason: String| SimError::Configuration(format!("Invalid log level: {reason}"));
    let is_directive_list = level.contains(['=', ',', '[']);
    if !is_directive_list {
        return match level.trim().to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            other => Err(invalid(other.to_string())),
        };
    }
    EnvFilter::try_new(level)
        .map(|_| ())
        .map_err(|e| invalid(format!("{level}: {e}")))
}

fn parse_var<T>(name: &str, value: &str) -> SimResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SimError::Configuration(format!("{name}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.shots, 1);
        assert_eq!(config.max_qubits, 24);
        assert_eq!(config.max_shots, 10_000_000);
        assert_eq!(config.parallel_threshold, 16384);
        assert_eq!(config.bit_order, BitOrder::IndexZeroFirst);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial() {
        let yaml = "shots: 100\nseed: 7\nkernel: scalar\nlogging:\n  format: json\n";
        let config = SimulationConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.shots, 100);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.kernel, KernelPath::Scalar);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.max_qubits, 24);
    }

    #[test]
    fn test_yaml_errors() {
        assert!(matches!(
            SimulationConfig::from_yaml("shots: [1, 2]"),
            Err(SimError::ConfigParse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_yaml("kernel: gpu"),
            Err(SimError::ConfigParse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_yaml("max_qubits: 40"),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimulationConfig::from_file("/nonexistent/kvant.yaml"),
            Err(SimError::Io(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = SimulationConfig::default()
            .apply_vars(vars(&[
                ("KVANT_SHOTS", "64"),
                ("KVANT_SEED", "123"),
                ("KVANT_KERNEL", "scalar"),
                ("KVANT_BIT_ORDER", "index_zero_last"),
                ("KVANT_LOG_LEVEL", "debug"),
            ]))
            .unwrap();
        assert_eq!(config.shots, 64);
        assert_eq!(config.seed, Some(123));
        assert_eq!(config.kernel, KernelPath::Scalar);
        assert_eq!(config.bit_order, BitOrder::IndexZeroLast);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_unset_leaves_values() {
        let config = SimulationConfig::default()
            .with_shots(9)
            .apply_vars(vars(&[]))
            .unwrap();
        assert_eq!(config.shots, 9);
    }

    #[test]
    fn test_env_bad_value() {
        let err = SimulationConfig::default()
            .apply_vars(vars(&[("KVANT_SHOTS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("KVANT_SHOTS"));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = SimulationConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_filter_directives() {
        for level in ["kvant_sim=debug", "info,kvant_sim=trace", "warn,kvant_ir=off"] {
            let mut config = SimulationConfig::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "{level}");
            assert!(crate::logging::env_filter(&config.logging).is_ok());
        }
        for level in ["kvant_sim=loud", "info,kvant_ir=verbose", "loud"] {
            let mut config = SimulationConfig::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_err(), "{level}");
        }
    }

    #[test]
    fn test_yaml_directive_level() {
        let config = SimulationConfig::from_yaml("logging:\n  level: kvant_sim=debug\n").unwrap();
        assert_eq!(config.logging.level, "kvant_sim=debug");
    }

    #[test]
    fn test_env_max_clbits() {
        let config = SimulationConfig::default()
            .apply_vars(vars(&[("KVANT_MAX_CLBITS", "16")]))
            .unwrap();
        assert_eq!(config.max_clbits, 16);
        assert_eq!(SimulationConfig::default().max_clbits, 1024);
    }

    #[test]
    fn test_validate_shots_above_max() {
        let mut config = SimulationConfig::default().with_shots(11);
        config.max_shots = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold() {
        let mut config = SimulationConfig::default();
        config.amplitude_threshold = f64::NAN;
        assert!(config.validate().is_err());
        config.amplitude_threshold = 0.0;
        assert!(config.validate().is_ok());
    }
}
