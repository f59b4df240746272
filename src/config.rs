//! Simulation configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags (or their environment variables). The merged result is
//! validated once before any source starts.
//!
//! # Example `config.yaml`
//!
//! ```yaml
//! sources: [Madrid, Londres, Sao Paulo]
//! min_delay_ms: 1000
//! max_delay_ms: 3000
//! failure_probability: 0.2
//! sink_name: Frankfurt
//! output: pretty
//! ```

use crate::cli::Cli;
use crate::models::SourceIdentity;
use crate::sink::OutputStyle;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Names of the simulated sources. Duplicates are simulated once.
    pub sources: Vec<String>,
    /// Lower bound of the wait between two fetches.
    pub min_delay_ms: u64,
    /// Upper bound of the wait between two fetches.
    pub max_delay_ms: u64,
    /// Probability that a fetch finds the source unavailable.
    pub failure_probability: f64,
    /// Name of the central aggregator shown in each record.
    pub sink_name: String,
    pub output: OutputStyle,
    /// Source `i` is seeded with `seed + i` when set.
    pub seed: Option<u64>,
    /// Cycles after which each source stops on its own.
    pub max_cycles: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                "Madrid".to_string(),
                "Londres".to_string(),
                "Sao Paulo".to_string(),
            ],
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            failure_probability: 0.2,
            sink_name: "Frankfurt".to_string(),
            output: OutputStyle::Pretty,
            seed: None,
            max_cycles: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load `path` if given, otherwise start from defaults.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ConfigError::Read {
                        path: path.to_string(),
                        source,
                    })?;
                let config = Self::from_yaml_str(&yaml)?;
                info!(path, "Loaded configuration file");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply the flags the user actually passed on top of `self`.
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if !args.sources.is_empty() {
            self.sources = args.sources.clone();
        }
        if let Some(v) = args.min_delay_ms {
            self.min_delay_ms = v;
        }
        if let Some(v) = args.max_delay_ms {
            self.max_delay_ms = v;
        }
        if let Some(v) = args.failure_probability {
            self.failure_probability = v;
        }
        if let Some(v) = &args.sink_name {
            self.sink_name = v.clone();
        }
        if let Some(v) = args.output {
            self.output = v;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if args.max_cycles.is_some() {
            self.max_cycles = args.max_cycles;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("at least one source is required".into()));
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("source names must not be blank".into()));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(ConfigError::Invalid(format!(
                "failure_probability must be within [0, 1], got {}",
                self.failure_probability
            )));
        }
        Ok(())
    }

    /// Unique, trimmed source identities in configuration order.
    pub fn source_identities(&self) -> Vec<SourceIdentity> {
        self.sources
            .iter()
            .map(|s| s.trim())
            .unique()
            .map(SourceIdentity::new)
            .collect()
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_match_reference_setup() {
        let config = SimulationConfig::default();
        assert_eq!(config.sources, ["Madrid", "Londres", "Sao Paulo"]);
        assert_eq!(config.min_delay(), Duration::from_secs(1));
        assert_eq!(config.max_delay(), Duration::from_secs(3));
        assert_eq!(config.failure_probability, 0.2);
        assert_eq!(config.sink_name, "Frankfurt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SimulationConfig::from_yaml_str(
            "sources: [Berlin]\nfailure_probability: 0.5\noutput: json\n",
        )
        .unwrap();
        assert_eq!(config.sources, ["Berlin"]);
        assert_eq!(config.failure_probability, 0.5);
        assert_eq!(config.output, OutputStyle::Json);
        assert_eq!(config.max_delay_ms, 3000);
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        let err = SimulationConfig::from_yaml_str("min_delay_ms: soon").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = SimulationConfig::load(Some("/nonexistent/newswire.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_load_without_path_uses_defaults() {
        let config = SimulationConfig::load(None).await.unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let args = Cli::parse_from([
            "newswire_sim",
            "--sources",
            "Lisboa,Roma",
            "--failure-probability",
            "0",
            "--seed",
            "9",
        ]);
        let config = SimulationConfig::from_yaml_str("sources: [Berlin]\nsink_name: Paris\n")
            .unwrap()
            .with_overrides(&args);
        assert_eq!(config.sources, ["Lisboa", "Roma"]);
        assert_eq!(config.failure_probability, 0.0);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.sink_name, "Paris");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.min_delay_ms = 5000;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.failure_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.sources = vec![];
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.sources = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_source_identities_are_unique() {
        let mut config = SimulationConfig::default();
        config.sources = vec!["Madrid".into(), " Madrid ".into(), "Londres".into()];
        let ids = config.source_identities();
        assert_eq!(ids, [SourceIdentity::new("Madrid"), SourceIdentity::new("Londres")]);
    }
}
