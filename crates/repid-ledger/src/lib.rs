//! Reputation score ledger for the RepID system.
//!
//! Every score change for a rostered agent goes through this ledger. Scores
//! never leave their configured bounds, the action history is append-only,
//! and achievements only ever accumulate. The ledger never panics; it
//! returns errors.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`Ledger`] struct: agent standings plus the
//!   append-only action history, and the `record_action` entry point.
//! - [`scoring`] -- Streak bonus, collaboration multiplier, and clamping.
//! - [`achievements`] -- Threshold predicates evaluated after each update.
//! - [`leaderboard`] -- Read-only standings report (rankings, trends,
//!   unity, momentum).
//! - [`config`] -- Tunable windows, bonuses, and thresholds.
//!
//! # Scoring
//!
//! For an action of category `C` by agent `A`:
//!
//! ```text
//! multiplier = 1 + step * (A's peer assists in the last 20 history entries)
//! streak     = bonus if A has >= 3 positive actions in the last 10 entries
//! points     = floor(base(C) * multiplier) + streak
//! score      = clamp(score + points, min, max)
//! ```
//!
//! # Usage
//!
//! ```
//! use repid_ledger::{Ledger, LedgerConfig};
//! use repid_types::ActionCategory;
//!
//! let mut ledger = Ledger::new(LedgerConfig::default()).ok();
//! let outcome = ledger
//!     .as_mut()
//!     .and_then(|l| l.record_action("Mel", ActionCategory::Breakthrough, "proof", None).ok());
//!
//! assert_eq!(outcome.map(|o| o.score), Some(550));
//! ```

pub mod achievements;
pub mod config;
pub mod leaderboard;
pub mod ledger;
pub mod scoring;

// Re-export primary types at crate root.
pub use config::{AchievementRules, LeaderboardRules, LedgerConfig, RosterConfig, ScoringRules};
pub use ledger::Ledger;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when building or updating the ledger.
///
/// A failed `record_action` leaves the ledger exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The named agent is not on the roster.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// The category has no entry in the point table, or the name does not
    /// parse as a category.
    #[error("unknown action category: {0}")]
    UnknownCategory(String),

    /// The roster lists the same agent twice.
    #[error("duplicate agent name: {0}")]
    DuplicateAgent(String),

    /// The ledger configuration is unusable.
    #[error("invalid ledger configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// A score computation overflowed.
    #[error("arithmetic overflow in score computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: &'static str,
    },
}

impl From<repid_types::UnknownCategory> for LedgerError {
    fn from(err: repid_types::UnknownCategory) -> Self {
        Self::UnknownCategory(err.0)
    }
}
