//! Error types for the RepID engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup, session
//! execution, and report output so `main` can propagate with `?`.

/// Top-level error for the RepID engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: repid_core::config::ConfigError,
    },

    /// Session loading or execution failed.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: repid_core::session::SessionError,
    },

    /// Report serialization failed.
    #[error("failed to serialize report: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing the report file failed.
    #[error("failed to write report to {path}: {source}")]
    Write {
        /// Destination path.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The log filter directive could not be parsed.
    #[error("invalid log filter {directive:?}: {message}")]
    LogFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },
}
