//! Configuration loading and typed config structures for RepID.
//!
//! The canonical configuration lives in `repid-config.yaml`. Each section
//! maps onto a strongly-typed struct; every field has a default so a partial
//! file (or no file at all) still yields a complete configuration. The
//! ledger sections reuse the structs from [`repid_ledger::config`].

use std::path::Path;

use serde::Deserialize;

use repid_ledger::{AchievementRules, LeaderboardRules, LedgerConfig, RosterConfig, ScoringRules};

use crate::opportunity::OpportunityConfig;

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "REPID_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable ledger or board.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level RepID configuration.
///
/// Mirrors the structure of `repid-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RepIdConfig {
    /// Roster and score bounds.
    #[serde(default)]
    pub ledger: RosterConfig,

    /// Point table, streak and collaboration rules.
    #[serde(default)]
    pub scoring: ScoringRules,

    /// Achievement thresholds.
    #[serde(default)]
    pub achievements: AchievementRules,

    /// Leaderboard windows.
    #[serde(default)]
    pub leaderboard: LeaderboardRules,

    /// Opportunity catalog and matching parameters.
    #[serde(default)]
    pub opportunities: OpportunityConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RepIdConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `REPID_LOG` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger_config()
            .validate()
            .map_err(|err| ConfigError::Invalid {
                reason: err.to_string(),
            })?;
        self.opportunities.validate()
    }

    /// Assemble the bundle a [`Ledger`](repid_ledger::Ledger) is built from.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            roster: self.ledger.clone(),
            scoring: self.scoring.clone(),
            achievements: self.achievements.clone(),
            leaderboard: self.leaderboard.clone(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Replace `level` with `REPID_LOG` when it is set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV)
            && !val.trim().is_empty()
        {
            self.level = val;
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}
