//! Tunable parameters for scoring, achievements, and reporting.
//!
//! Every window size, bonus, and threshold the ledger uses lives here with
//! its historical default. The [`LedgerConfig`] bundle is what a [`Ledger`]
//! is built from; `repid-core` deserializes each section from
//! `repid-config.yaml` and assembles the bundle.
//!
//! [`Ledger`]: crate::Ledger

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use repid_types::ActionCategory;

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The agents a ledger tracks and the bounds their scores live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Agent names, in roster order. Order breaks leaderboard ties.
    pub agents: Vec<String>,
    /// Score every agent starts with (default: 500).
    pub starting_score: u32,
    /// Lowest reachable score (default: 0).
    pub min_score: u32,
    /// Highest reachable score (default: 1000).
    pub max_score: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            agents: vec![
                String::from("HyperDAGManager"),
                String::from("AI-Prompt-Manager"),
                String::from("Mel"),
            ],
            starting_score: 500,
            min_score: 0,
            max_score: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Point table and bonus rules applied by `record_action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Base points per category. A category missing from this table is
    /// rejected as unknown. A table given in configuration replaces the
    /// default table entirely.
    pub points: BTreeMap<ActionCategory, i32>,

    /// Number of most recent history entries inspected for a streak
    /// (default: 10).
    pub streak_window: usize,

    /// Positive actions by the same agent within the streak window needed
    /// to earn the bonus (default: 3).
    pub streak_min_positive: usize,

    /// Points added when a streak is active (default: 10).
    pub streak_bonus: i32,

    /// Number of most recent history entries inspected for peer assists
    /// (default: 20).
    pub collaboration_window: usize,

    /// Multiplier increase per recent peer assist (default: 0.1).
    pub collaboration_step: Decimal,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points: default_points(),
            streak_window: 10,
            streak_min_positive: 3,
            streak_bonus: 10,
            collaboration_window: 20,
            collaboration_step: Decimal::new(1, 1),
        }
    }
}

impl ScoringRules {
    /// Look up the base points for a category.
    pub fn base_points(&self, category: ActionCategory) -> Option<i32> {
        self.points.get(&category).copied()
    }
}

/// The historical point table.
pub fn default_points() -> BTreeMap<ActionCategory, i32> {
    BTreeMap::from([
        (ActionCategory::Breakthrough, 50),
        (ActionCategory::FalsePositiveCatch, 30),
        (ActionCategory::FalseClaim, -100),
        (ActionCategory::StatisticalError, -75),
        (ActionCategory::PeerAssist, 10),
        (ActionCategory::Documentation, 5),
        (ActionCategory::Collaboration, 15),
        (ActionCategory::OpportunityMatch, 25),
    ])
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Unlock thresholds for each achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementRules {
    /// Score needed for Harmonic Master (default: 800).
    pub harmonic_master: u32,
    /// Score needed for Truth Guardian (default: 900).
    pub truth_guardian: u32,
    /// Score needed for Unity Perfectionist (default: 950).
    pub unity_perfectionist: u32,
    /// Lifetime breakthrough actions needed for Discovery Pioneer
    /// (default: 5).
    pub discovery_pioneer_breakthroughs: usize,
}

impl Default for AchievementRules {
    fn default() -> Self {
        Self {
            harmonic_master: 800,
            truth_guardian: 900,
            unity_perfectionist: 950,
            discovery_pioneer_breakthroughs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// Windows and scales used when building a leaderboard report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardRules {
    /// History entries summed into each agent's trend (default: 10).
    pub trend_window: usize,
    /// History entries inspected for momentum (default: 50).
    pub momentum_window: usize,
    /// Divisor mapping score variance onto the unity statistic
    /// (default: 10000).
    pub unity_variance_scale: f64,
}

impl Default for LeaderboardRules {
    fn default() -> Self {
        Self {
            trend_window: 10,
            momentum_window: 50,
            unity_variance_scale: 10_000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Everything a [`Ledger`](crate::Ledger) needs to be constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerConfig {
    /// Agents and score bounds.
    pub roster: RosterConfig,
    /// Point table and bonuses.
    pub scoring: ScoringRules,
    /// Achievement thresholds.
    pub achievements: AchievementRules,
    /// Report windows.
    pub leaderboard: LeaderboardRules,
}

impl LedgerConfig {
    /// Check that the parameters describe a usable ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfig`] for inverted score bounds, a
    /// starting score outside them, zero-sized windows, a non-positive
    /// variance scale, or a negative collaboration step.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let roster = &self.roster;
        if roster.min_score > roster.max_score {
            return Err(invalid(format!(
                "min_score {} exceeds max_score {}",
                roster.min_score, roster.max_score
            )));
        }
        if !(roster.min_score..=roster.max_score).contains(&roster.starting_score) {
            return Err(invalid(format!(
                "starting_score {} outside [{}, {}]",
                roster.starting_score, roster.min_score, roster.max_score
            )));
        }

        let windows = [
            ("scoring.streak_window", self.scoring.streak_window),
            ("scoring.collaboration_window", self.scoring.collaboration_window),
            ("leaderboard.trend_window", self.leaderboard.trend_window),
            ("leaderboard.momentum_window", self.leaderboard.momentum_window),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, size)| *size == 0) {
            return Err(invalid(format!("{name} must be greater than zero")));
        }

        if self.scoring.collaboration_step.is_sign_negative() {
            return Err(invalid(String::from(
                "scoring.collaboration_step must not be negative",
            )));
        }

        let scale = self.leaderboard.unity_variance_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(invalid(format!(
                "leaderboard.unity_variance_scale must be positive, got {scale}"
            )));
        }

        Ok(())
    }
}

const fn invalid(reason: String) -> LedgerError {
    LedgerError::InvalidConfig { reason }
}
