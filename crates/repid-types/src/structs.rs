//! Record and report structs shared across the RepID workspace.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Achievement, ActionCategory};
use crate::ids::ActionId;

/// Opaque supporting data attached to an action (statistics, links, sizes).
///
/// The ledger never interprets evidence; it is stored and exported as-is.
pub type Evidence = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Action history
// ---------------------------------------------------------------------------

/// One scoring event, appended to the ledger history and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionRecord {
    /// Unique record identifier.
    pub id: ActionId,
    /// Zero-based position in the ledger history.
    pub sequence: u64,
    /// Name of the agent the action is credited to.
    pub agent: String,
    /// Why the score changed.
    pub category: ActionCategory,
    /// Base value looked up from the points table.
    pub base_points: i32,
    /// Collaboration multiplier in effect (1.0 with no recent assists).
    #[ts(as = "String")]
    pub multiplier: Decimal,
    /// Streak bonus added after the multiplier (0 or the configured bonus).
    pub streak_bonus: i32,
    /// Final delta: `floor(base_points * multiplier) + streak_bonus`.
    pub points: i32,
    /// Free-text description supplied by the caller.
    pub description: String,
    /// When the action was recorded. Non-decreasing along the history.
    pub timestamp: DateTime<Utc>,
    /// Supporting data supplied by the caller.
    pub evidence: Evidence,
    /// Whether the action passed ledger validation.
    pub verified: bool,
}

impl ActionRecord {
    /// Whether this action raised the agent's score before clamping.
    pub const fn is_positive(&self) -> bool {
        self.points > 0
    }
}

/// Result of a successful `record_action` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RecordOutcome {
    /// The appended history record.
    pub record: ActionRecord,
    /// The agent's score after clamping.
    pub score: u32,
    /// Achievements unlocked by this action, in declaration order.
    pub unlocked: Vec<Achievement>,
}

// ---------------------------------------------------------------------------
// Agent standing
// ---------------------------------------------------------------------------

/// An agent's current position in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentStanding {
    /// Roster name, unique within a ledger.
    pub name: String,
    /// Current score, always within the configured bounds.
    pub score: u32,
    /// Unlocked achievements. Only ever grows.
    pub achievements: BTreeSet<Achievement>,
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// A single leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RankedAgent {
    /// One-based rank.
    pub rank: u32,
    /// Agent name.
    pub agent: String,
    /// Score at report time.
    pub score: u32,
}

/// Aggregate figures for the whole roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TeamStats {
    /// Sum of all scores.
    pub total_score: u64,
    /// Mean score, 0.0 for an empty roster.
    pub average_score: f64,
    /// Number of achievements unlocked across all agents.
    pub total_achievements: u32,
    /// Length of the action history.
    pub action_count: u64,
}

/// Read-only snapshot of current standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardReport {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Agents sorted by score, highest first. Ties keep roster order.
    pub rankings: Vec<RankedAgent>,
    /// Per-agent sum of points within the recent trend window.
    pub trends: BTreeMap<String, i64>,
    /// Score-spread statistic in `[0, 1]`; 1.0 means identical scores.
    pub unity: f64,
    /// Share of recent actions with positive points, in `[0, 1]`.
    pub momentum: f64,
    /// Per-agent number of unlocked achievements.
    pub achievement_counts: BTreeMap<String, u32>,
    /// Roster-wide aggregates.
    pub team: TeamStats,
    /// Relevant opportunities on the board when the snapshot was taken.
    /// The ledger has no board and reports 0; the session runner fills
    /// this in after a scan.
    #[serde(default)]
    pub opportunities_available: u32,
}
