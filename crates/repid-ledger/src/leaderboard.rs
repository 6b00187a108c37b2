//! Read-only standings report.
//!
//! Building a report never mutates the ledger and never fails: degenerate
//! inputs (empty roster, empty history) map to defined defaults.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use repid_types::{ActionRecord, AgentStanding, LeaderboardReport, RankedAgent, TeamStats};

use crate::config::LeaderboardRules;
use crate::scoring::recent;

/// Build a [`LeaderboardReport`] from the given standings and history.
///
/// `agents` must be in roster order; ties in score keep that order.
pub fn build_report(
    agents: &[AgentStanding],
    history: &[ActionRecord],
    rules: &LeaderboardRules,
    timestamp: DateTime<Utc>,
) -> LeaderboardReport {
    let achievement_counts: BTreeMap<String, u32> = agents
        .iter()
        .map(|agent| (agent.name.clone(), saturating_u32(agent.achievements.len())))
        .collect();

    LeaderboardReport {
        timestamp,
        rankings: rankings(agents),
        trends: trends(agents, history, rules.trend_window),
        unity: unity(agents, rules.unity_variance_scale),
        momentum: momentum(history, rules.momentum_window),
        achievement_counts,
        team: team_stats(agents, history),
        opportunities_available: 0,
    }
}

/// Agents sorted by score descending, ranks starting at 1.
pub fn rankings(agents: &[AgentStanding]) -> Vec<RankedAgent> {
    let mut ordered: Vec<&AgentStanding> = agents.iter().collect();
    // `sort_by` is stable, so equal scores keep roster order.
    ordered.sort_by(|a, b| b.score.cmp(&a.score));

    ordered
        .into_iter()
        .zip(1_u32..)
        .map(|(agent, rank)| RankedAgent {
            rank,
            agent: agent.name.clone(),
            score: agent.score,
        })
        .collect()
}

/// Per-agent sum of points within the last `window` history entries.
///
/// Every rostered agent appears, with 0 when it has no recent actions.
pub fn trends(
    agents: &[AgentStanding],
    history: &[ActionRecord],
    window: usize,
) -> BTreeMap<String, i64> {
    let mut sums: BTreeMap<String, i64> = agents
        .iter()
        .map(|agent| (agent.name.clone(), 0))
        .collect();

    for record in recent(history, window) {
        if let Some(sum) = sums.get_mut(&record.agent) {
            *sum = sum.saturating_add(i64::from(record.points));
        }
    }

    sums
}

/// `max(0, 1 - variance / scale)` over the current scores.
///
/// Uses the population variance. An empty roster has no spread and yields
/// 1.0. The result is always within `[0, 1]`.
pub fn unity(agents: &[AgentStanding], scale: f64) -> f64 {
    let Some(variance) = population_variance(agents) else {
        return 1.0;
    };
    if !scale.is_finite() || scale <= 0.0 {
        return 0.0;
    }
    (1.0 - variance / scale).clamp(0.0, 1.0)
}

/// Share of the last `window` actions (all agents) with positive points.
///
/// Returns 0.0 for an empty history.
pub fn momentum(history: &[ActionRecord], window: usize) -> f64 {
    let recent_actions = recent(history, window);
    if recent_actions.is_empty() {
        return 0.0;
    }
    let positive = recent_actions.iter().filter(|r| r.is_positive()).count();
    f64::from(saturating_u32(positive)) / f64::from(saturating_u32(recent_actions.len()))
}

/// Roster-wide totals.
pub fn team_stats(agents: &[AgentStanding], history: &[ActionRecord]) -> TeamStats {
    let total_score = agents
        .iter()
        .fold(0_u64, |acc, agent| acc.saturating_add(u64::from(agent.score)));
    let total_achievements = agents.iter().fold(0_u32, |acc, agent| {
        acc.saturating_add(saturating_u32(agent.achievements.len()))
    });

    TeamStats {
        total_score,
        average_score: mean(agents).unwrap_or(0.0),
        total_achievements,
        action_count: u64::try_from(history.len()).unwrap_or(u64::MAX),
    }
}

fn mean(agents: &[AgentStanding]) -> Option<f64> {
    if agents.is_empty() {
        return None;
    }
    let sum: f64 = agents.iter().map(|agent| f64::from(agent.score)).sum();
    Some(sum / f64::from(saturating_u32(agents.len())))
}

fn population_variance(agents: &[AgentStanding]) -> Option<f64> {
    let mean = mean(agents)?;
    let squares: f64 = agents
        .iter()
        .map(|agent| {
            let deviation = f64::from(agent.score) - mean;
            deviation * deviation
        })
        .sum();
    Some(squares / f64::from(saturating_u32(agents.len())))
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
