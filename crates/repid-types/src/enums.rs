//! Enumeration types for the RepID ledger.
//!
//! Both enumerations are closed sets. Categories carry their point values in
//! configuration rather than here, so a deployment can rebalance the table
//! without touching types.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Action categories
// ---------------------------------------------------------------------------

/// The reason an agent's score changed.
///
/// Serialized in `snake_case` (`"peer_assist"`, `"false_claim"`, ...), which
/// is also the form accepted by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionCategory {
    /// A verified research breakthrough.
    Breakthrough,
    /// Caught somebody else's false positive before it was published.
    FalsePositiveCatch,
    /// Made a claim that turned out to be false (penalty).
    FalseClaim,
    /// Made a statistical error (penalty).
    StatisticalError,
    /// Helped another agent. Drives the collaboration multiplier.
    PeerAssist,
    /// Wrote or organized documentation.
    Documentation,
    /// Coordinated work with other agents.
    Collaboration,
    /// Matched a discovery to an external funding opportunity.
    OpportunityMatch,
}

impl ActionCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Breakthrough,
        Self::FalsePositiveCatch,
        Self::FalseClaim,
        Self::StatisticalError,
        Self::PeerAssist,
        Self::Documentation,
        Self::Collaboration,
        Self::OpportunityMatch,
    ];

    /// The `snake_case` wire name of this category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakthrough => "breakthrough",
            Self::FalsePositiveCatch => "false_positive_catch",
            Self::FalseClaim => "false_claim",
            Self::StatisticalError => "statistical_error",
            Self::PeerAssist => "peer_assist",
            Self::Documentation => "documentation",
            Self::Collaboration => "collaboration",
            Self::OpportunityMatch => "opportunity_match",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name any [`ActionCategory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action category: {}", self.0)
    }
}

impl core::error::Error for UnknownCategory {}

impl FromStr for ActionCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// A milestone an agent unlocks at most once.
///
/// The ordering is the declaration order, which is also the order
/// achievements are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Achievement {
    /// Score reached the first mastery threshold (800 by default).
    HarmonicMaster,
    /// Score reached the second mastery threshold (900 by default).
    TruthGuardian,
    /// Score reached the top threshold (950 by default).
    UnityPerfectionist,
    /// Recorded enough breakthroughs (5 by default).
    DiscoveryPioneer,
}

impl Achievement {
    /// Human-readable name used in logs and printed leaderboards.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::HarmonicMaster => "Harmonic Master",
            Self::TruthGuardian => "Truth Guardian",
            Self::UnityPerfectionist => "Unity Perfectionist",
            Self::DiscoveryPioneer => "Discovery Pioneer",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
