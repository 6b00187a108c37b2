//! RepID engine binary.
//!
//! Loads configuration, replays a scoring session into a fresh ledger,
//! logs the resulting leaderboard, and writes the full session report as
//! JSON.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `repid-config.yaml` (or `REPID_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the session script from `REPID_SESSION`, or use the built-in one
//! 4. Run the session
//! 5. Log the leaderboard
//! 6. Write the report to `REPID_REPORT` (default `repid-report.json`)

mod error;

use std::path::{Path, PathBuf};

use repid_core::config::{LoggingConfig, RepIdConfig};
use repid_core::session::{self, SessionReport, SessionScript};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "repid-config.yaml";

/// Default report destination.
const DEFAULT_REPORT_PATH: &str = "repid-report.json";

/// Application entry point for the RepID engine.
///
/// # Errors
///
/// Returns an error if configuration, the session, or report output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so failures here are
    //    reported by the runtime rather than through tracing.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(config = %config_source, "repid-engine starting");
    info!(
        agents = config.ledger.agents.len(),
        starting_score = config.ledger.starting_score,
        streak_window = config.scoring.streak_window,
        collaboration_window = config.scoring.collaboration_window,
        "Configuration loaded"
    );

    // 3. Load the session script.
    let script = load_script()?;

    // 4. Run the session.
    let report = session::run_session(&config, &script).map_err(EngineError::from)?;

    // 5. Log the leaderboard.
    log_leaderboard(&report);

    // 6. Write the report.
    let report_path = env_path("REPID_REPORT", DEFAULT_REPORT_PATH);
    write_report(&report, &report_path)?;

    info!(
        report = %report_path.display(),
        report_id = %report.id,
        "repid-engine shutdown complete"
    );
    Ok(())
}

/// Load configuration from `REPID_CONFIG` or `repid-config.yaml`.
///
/// A missing default file means defaults; a missing file named explicitly
/// through `REPID_CONFIG` is an error.
fn load_config() -> Result<(RepIdConfig, String), EngineError> {
    if let Ok(explicit) = std::env::var("REPID_CONFIG") {
        let config = RepIdConfig::from_file(Path::new(&explicit))?;
        return Ok((config, explicit));
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = RepIdConfig::from_file(path)?;
        Ok((config, DEFAULT_CONFIG_PATH.to_owned()))
    } else {
        let mut config = RepIdConfig::default();
        config.logging.apply_env_overrides();
        Ok((config, String::from("defaults")))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| EngineError::LogFilter {
            directive: logging.level.clone(),
            message: e.to_string(),
        })?,
    };

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
    Ok(())
}

/// Load the session script named by `REPID_SESSION`, or the built-in one.
fn load_script() -> Result<SessionScript, EngineError> {
    match std::env::var("REPID_SESSION") {
        Ok(path) => {
            let script = SessionScript::from_file(Path::new(&path))?;
            info!(path = %path, steps = script.steps.len(), "Session script loaded");
            Ok(script)
        }
        Err(_) => {
            info!("REPID_SESSION not set, using built-in session");
            Ok(SessionScript::builtin())
        }
    }
}

/// Emit one log line per leaderboard row plus the roster statistics.
fn log_leaderboard(report: &SessionReport) {
    let leaderboard = &report.leaderboard;
    for row in &leaderboard.rankings {
        info!(
            rank = row.rank,
            agent = %row.agent,
            score = row.score,
            trend = leaderboard.trends.get(&row.agent).copied().unwrap_or(0),
            achievements = leaderboard
                .achievement_counts
                .get(&row.agent)
                .copied()
                .unwrap_or(0),
            "Leaderboard"
        );
    }

    for (agent, unlocked) in &report.achievements {
        for achievement in unlocked {
            info!(agent = %agent, achievement = %achievement, "Achievement held");
        }
    }

    info!(
        unity = leaderboard.unity,
        momentum = leaderboard.momentum,
        total_score = leaderboard.team.total_score,
        average_score = leaderboard.team.average_score,
        opportunities = leaderboard.opportunities_available,
        opportunity_matches = report.opportunity_matches.len(),
        sustainability_potential = report.sustainability_potential,
        "Team statistics"
    );
}

/// Serialize the report as pretty JSON and write it to `path`.
fn write_report(report: &SessionReport, path: &Path) -> Result<(), EngineError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|source| EngineError::Write {
        path: path.display().to_string(),
        source,
    })
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var).map_or_else(|| PathBuf::from(default), PathBuf::from)
}
