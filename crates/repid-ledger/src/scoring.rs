//! Point computation for a single scoring event.
//!
//! All functions here are pure: they read the history as it stood before the
//! new action and return numbers. Windows are taken over the global history
//! (all agents interleaved) and then filtered to the acting agent, so an
//! agent's streak can be pushed out of the window by other agents' activity.
//!
//! The multiplier is computed with [`Decimal`] so that `50 * 1.3` is exactly
//! 65 rather than a float that floors to 64.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use repid_types::{ActionCategory, ActionRecord};

use crate::LedgerError;
use crate::config::ScoringRules;

/// The last `size` entries of `history` (fewer if the history is shorter).
pub fn recent(history: &[ActionRecord], size: usize) -> &[ActionRecord] {
    let start = history.len().saturating_sub(size);
    history.get(start..).unwrap_or_default()
}

/// Streak bonus owed to `agent` given the history before the new action.
///
/// The bonus applies when at least `streak_min_positive` of the last
/// `streak_window` history entries are positive actions by `agent`. It is
/// added regardless of the sign of the action being scored.
pub fn streak_bonus(history: &[ActionRecord], agent: &str, rules: &ScoringRules) -> i32 {
    let positives = recent(history, rules.streak_window)
        .iter()
        .filter(|record| record.agent == agent && record.is_positive())
        .count();

    if positives >= rules.streak_min_positive {
        rules.streak_bonus
    } else {
        0
    }
}

/// Collaboration multiplier for `agent`: one plus `collaboration_step` for
/// every peer assist `agent` has within the collaboration window.
///
/// The window bounds the multiplier; with the defaults (20 entries, 0.1
/// step) it can reach at most 3.0 and in mixed histories stays near 2.0.
///
/// # Errors
///
/// Returns [`LedgerError::ArithmeticOverflow`] if the step times the count
/// does not fit a [`Decimal`].
pub fn collaboration_multiplier(
    history: &[ActionRecord],
    agent: &str,
    rules: &ScoringRules,
) -> Result<Decimal, LedgerError> {
    let assists = recent(history, rules.collaboration_window)
        .iter()
        .filter(|record| record.agent == agent && record.category == ActionCategory::PeerAssist)
        .count();

    rules
        .collaboration_step
        .checked_mul(Decimal::from(assists))
        .and_then(|bonus| Decimal::ONE.checked_add(bonus))
        .ok_or(LedgerError::ArithmeticOverflow {
            context: "collaboration multiplier",
        })
}

/// Final delta: `floor(base * multiplier) + streak_bonus`.
///
/// Flooring rounds toward negative infinity, so penalties scaled by the
/// multiplier round away from zero (`-75 * 1.1 = -82.5` becomes `-83`).
///
/// # Errors
///
/// Returns [`LedgerError::ArithmeticOverflow`] if the result does not fit
/// an `i32`.
pub fn compute_points(base: i32, multiplier: Decimal, streak_bonus: i32) -> Result<i32, LedgerError> {
    Decimal::from(base)
        .checked_mul(multiplier)
        .and_then(|scaled| scaled.floor().to_i32())
        .and_then(|scaled| scaled.checked_add(streak_bonus))
        .ok_or(LedgerError::ArithmeticOverflow {
            context: "action points",
        })
}

/// Apply `points` to `score` and clamp into `[min, max]`.
pub fn apply_delta(score: u32, points: i32, min: u32, max: u32) -> u32 {
    let raw = i64::from(score).saturating_add(i64::from(points));
    let clamped = raw.clamp(i64::from(min), i64::from(max));
    // Clamped into a u32 range above, so the conversion cannot fail.
    u32::try_from(clamped).unwrap_or(min)
}
