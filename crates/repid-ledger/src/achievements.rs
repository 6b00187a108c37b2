//! Achievement predicates evaluated after each score update.
//!
//! Each achievement is an independent threshold rule. Rules are checked in
//! [`Achievement`] declaration order and an achievement already held is
//! never reported again.

use repid_types::{Achievement, ActionCategory, ActionRecord, AgentStanding};

use crate::config::AchievementRules;

/// Whether `achievement`'s threshold is met, ignoring whether it is held.
fn threshold_met(
    achievement: Achievement,
    standing: &AgentStanding,
    history: &[ActionRecord],
    rules: &AchievementRules,
) -> bool {
    match achievement {
        Achievement::HarmonicMaster => standing.score >= rules.harmonic_master,
        Achievement::TruthGuardian => standing.score >= rules.truth_guardian,
        Achievement::UnityPerfectionist => standing.score >= rules.unity_perfectionist,
        Achievement::DiscoveryPioneer => {
            breakthrough_count(history, &standing.name) >= rules.discovery_pioneer_breakthroughs
        }
    }
}

/// Lifetime number of breakthrough actions credited to `agent`.
pub fn breakthrough_count(history: &[ActionRecord], agent: &str) -> usize {
    history
        .iter()
        .filter(|record| record.agent == agent && record.category == ActionCategory::Breakthrough)
        .count()
}

/// Achievements `standing` qualifies for but does not yet hold.
///
/// `history` must already include the action that triggered the check.
pub fn newly_unlocked(
    standing: &AgentStanding,
    history: &[ActionRecord],
    rules: &AchievementRules,
) -> Vec<Achievement> {
    [
        Achievement::HarmonicMaster,
        Achievement::TruthGuardian,
        Achievement::UnityPerfectionist,
        Achievement::DiscoveryPioneer,
    ]
    .into_iter()
    .filter(|achievement| !standing.achievements.contains(achievement))
    .filter(|achievement| threshold_met(*achievement, standing, history, rules))
    .collect()
}
