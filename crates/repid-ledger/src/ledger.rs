//! The score ledger: agent standings plus an append-only action history.
//!
//! # Design
//!
//! - **Explicitly owned**: a [`Ledger`] is a plain value; callers pass it
//!   by reference. There is no shared or global state.
//! - **All-or-nothing**: `record_action` validates the agent and category
//!   and computes the full delta before touching any state.
//! - **Append-only**: history entries are never modified or deleted, and
//!   their timestamps never go backwards.
//! - **Monotonic achievements**: achievement sets only grow.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use repid_types::{
    Achievement, ActionCategory, ActionId, ActionRecord, AgentStanding, Evidence,
    LeaderboardReport, RecordOutcome,
};

use crate::config::LedgerConfig;
use crate::{LedgerError, achievements, leaderboard, scoring};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Reputation ledger for a fixed roster of agents.
///
/// Single-threaded by construction: every mutation takes `&mut self`.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Parameters the ledger was built with.
    config: LedgerConfig,
    /// Standings in roster order.
    agents: Vec<AgentStanding>,
    /// Agent name to position in `agents`.
    index: BTreeMap<String, usize>,
    /// All actions, in recording order.
    history: Vec<ActionRecord>,
}

impl Ledger {
    /// Build a ledger with every rostered agent at the starting score.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfig`] if the configuration fails
    /// validation, or [`LedgerError::DuplicateAgent`] if a name repeats.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;

        let mut agents = Vec::with_capacity(config.roster.agents.len());
        let mut index = BTreeMap::new();
        for name in &config.roster.agents {
            if index.insert(name.clone(), agents.len()).is_some() {
                return Err(LedgerError::DuplicateAgent(name.clone()));
            }
            agents.push(AgentStanding {
                name: name.clone(),
                score: config.roster.starting_score,
                achievements: BTreeSet::new(),
            });
        }

        info!(
            agents = agents.len(),
            starting_score = config.roster.starting_score,
            "Ledger initialized"
        );

        Ok(Self {
            config,
            agents,
            index,
            history: Vec::new(),
        })
    }

    /// The parameters this ledger was built with.
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Number of recorded actions.
    pub const fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no action has been recorded yet.
    pub const fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The full action history, oldest first.
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    /// All standings in roster order.
    pub fn agents(&self) -> &[AgentStanding] {
        &self.agents
    }

    /// One agent's standing.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAgent`] if the name is not rostered.
    pub fn standing(&self, agent: &str) -> Result<&AgentStanding, LedgerError> {
        self.position(agent)
            .and_then(|pos| self.agents.get(pos))
            .ok_or_else(|| LedgerError::UnknownAgent(agent.to_owned()))
    }

    /// One agent's current score.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAgent`] if the name is not rostered.
    pub fn score(&self, agent: &str) -> Result<u32, LedgerError> {
        self.standing(agent).map(|standing| standing.score)
    }

    /// Record a scoring event stamped with the current time.
    ///
    /// See [`record_action_at`](Self::record_action_at).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAgent`] or
    /// [`LedgerError::UnknownCategory`] without changing any state.
    pub fn record_action(
        &mut self,
        agent: &str,
        category: ActionCategory,
        description: impl Into<String>,
        evidence: Option<Evidence>,
    ) -> Result<RecordOutcome, LedgerError> {
        self.record_action_at(agent, category, description, evidence, Utc::now())
    }

    /// Record a scoring event, parsing the category from its `snake_case`
    /// name (e.g. `"peer_assist"`).
    ///
    /// # Errors
    ///
    /// As [`record_action`](Self::record_action). The agent is checked
    /// first; an unparseable name for a rostered agent is reported as
    /// [`LedgerError::UnknownCategory`].
    pub fn record_action_named(
        &mut self,
        agent: &str,
        category: &str,
        description: impl Into<String>,
        evidence: Option<Evidence>,
    ) -> Result<RecordOutcome, LedgerError> {
        if self.position(agent).is_none() {
            warn!(agent, category, "Rejected action: unknown agent");
            return Err(LedgerError::UnknownAgent(agent.to_owned()));
        }
        let category: ActionCategory = category.parse().inspect_err(|err| {
            warn!(agent, error = %err, "Rejected action");
        })?;
        self.record_action(agent, category, description, evidence)
    }

    /// Record a scoring event at an explicit time.
    ///
    /// Looks up the base points, applies the collaboration multiplier and
    /// streak bonus computed from the history before this action, clamps
    /// the new score, appends the record, and evaluates achievements.
    ///
    /// If `timestamp` is earlier than the last recorded action, the last
    /// action's timestamp is used so the history stays ordered.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAgent`],
    /// [`LedgerError::UnknownCategory`], or
    /// [`LedgerError::ArithmeticOverflow`]. On error nothing is changed.
    pub fn record_action_at(
        &mut self,
        agent: &str,
        category: ActionCategory,
        description: impl Into<String>,
        evidence: Option<Evidence>,
        timestamp: DateTime<Utc>,
    ) -> Result<RecordOutcome, LedgerError> {
        // Validate and compute everything before mutating.
        let Some(pos) = self.position(agent) else {
            warn!(agent, %category, "Rejected action: unknown agent");
            return Err(LedgerError::UnknownAgent(agent.to_owned()));
        };
        let Some(base_points) = self.config.scoring.base_points(category) else {
            warn!(agent, %category, "Rejected action: category not in point table");
            return Err(LedgerError::UnknownCategory(category.as_str().to_owned()));
        };
        let old_score = self
            .agents
            .get(pos)
            .map(|standing| standing.score)
            .ok_or_else(|| LedgerError::UnknownAgent(agent.to_owned()))?;

        let rules = &self.config.scoring;
        let streak_bonus = scoring::streak_bonus(&self.history, agent, rules);
        let multiplier = scoring::collaboration_multiplier(&self.history, agent, rules)?;
        let points = scoring::compute_points(base_points, multiplier, streak_bonus)?;
        let roster = &self.config.roster;
        let new_score = scoring::apply_delta(old_score, points, roster.min_score, roster.max_score);

        debug!(
            agent,
            %category,
            base_points,
            %multiplier,
            streak_bonus,
            points,
            "Computed action points"
        );

        let timestamp = self
            .history
            .last()
            .map_or(timestamp, |last| timestamp.max(last.timestamp));
        let record = ActionRecord {
            id: ActionId::new(),
            sequence: u64::try_from(self.history.len()).unwrap_or(u64::MAX),
            agent: agent.to_owned(),
            category,
            base_points,
            multiplier,
            streak_bonus,
            points,
            description: description.into(),
            timestamp,
            evidence: evidence.unwrap_or_default(),
            verified: true,
        };

        // Commit.
        if let Some(standing) = self.agents.get_mut(pos) {
            standing.score = new_score;
        }
        self.history.push(record.clone());

        info!(
            agent,
            %category,
            points,
            old_score,
            new_score,
            "RepID updated"
        );

        let unlocked = self.check_achievements(&record)?;

        Ok(RecordOutcome {
            record,
            score: new_score,
            unlocked,
        })
    }

    /// Evaluate achievement rules for the agent credited with `record` and
    /// add any newly met ones to its set.
    ///
    /// `record` should be the action just appended. Returns the newly
    /// unlocked achievements in declaration order (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAgent`] if the record's agent is not
    /// rostered.
    pub fn check_achievements(
        &mut self,
        record: &ActionRecord,
    ) -> Result<Vec<Achievement>, LedgerError> {
        let pos = self
            .position(&record.agent)
            .ok_or_else(|| LedgerError::UnknownAgent(record.agent.clone()))?;
        let Some(standing) = self.agents.get_mut(pos) else {
            return Err(LedgerError::UnknownAgent(record.agent.clone()));
        };

        let unlocked =
            achievements::newly_unlocked(standing, &self.history, &self.config.achievements);
        for achievement in &unlocked {
            standing.achievements.insert(*achievement);
            info!(agent = %standing.name, %achievement, "Achievement unlocked");
        }

        Ok(unlocked)
    }

    /// Achievements held by `agent`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAgent`] if the name is not rostered.
    pub fn get_achievements(&self, agent: &str) -> Result<Vec<Achievement>, LedgerError> {
        self.standing(agent)
            .map(|standing| standing.achievements.iter().copied().collect())
    }

    /// Snapshot of current standings stamped with the current time.
    pub fn get_leaderboard(&self) -> LeaderboardReport {
        self.leaderboard_at(Utc::now())
    }

    /// Snapshot of current standings with an explicit timestamp.
    pub fn leaderboard_at(&self, timestamp: DateTime<Utc>) -> LeaderboardReport {
        leaderboard::build_report(
            &self.agents,
            &self.history,
            &self.config.leaderboard,
            timestamp,
        )
    }

    fn position(&self, agent: &str) -> Option<usize> {
        self.index.get(agent).copied()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use repid_types::Achievement;

    use super::*;

    fn ledger() -> Result<Ledger, LedgerError> {
        Ledger::new(LedgerConfig::default())
    }

    fn ledger_with_score(agent: &str, score: u32) -> Result<Ledger, LedgerError> {
        let mut ledger = ledger()?;
        let pos = ledger
            .position(agent)
            .ok_or_else(|| LedgerError::UnknownAgent(agent.to_owned()))?;
        if let Some(standing) = ledger.agents.get_mut(pos) {
            standing.score = score;
        }
        Ok(ledger)
    }

    fn record(
        ledger: &mut Ledger,
        agent: &str,
        category: ActionCategory,
    ) -> Result<RecordOutcome, LedgerError> {
        ledger.record_action(agent, category, "test action", None)
    }

    #[test]
    fn new_ledger_seeds_roster_at_starting_score() -> Result<(), LedgerError> {
        let ledger = ledger()?;
        assert!(ledger.is_empty());
        assert_eq!(ledger.agents().len(), 3);
        assert!(ledger.agents().iter().all(|a| a.score == 500));
        Ok(())
    }

    #[test]
    fn duplicate_roster_names_rejected() {
        let mut config = LedgerConfig::default();
        config.roster.agents = vec![String::from("Mel"), String::from("Mel")];
        assert!(matches!(
            Ledger::new(config),
            Err(LedgerError::DuplicateAgent(name)) if name == "Mel"
        ));
    }

    #[test]
    fn plain_breakthrough_adds_base_points() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let outcome = record(&mut ledger, "Mel", ActionCategory::Breakthrough)?;

        assert_eq!(outcome.score, 550);
        assert_eq!(outcome.record.points, 50);
        assert_eq!(outcome.record.sequence, 0);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.score("Mel")?, 550);
        Ok(())
    }

    #[test]
    fn score_clamps_at_maximum() -> Result<(), LedgerError> {
        let mut ledger = ledger_with_score("Mel", 990)?;
        let outcome = record(&mut ledger, "Mel", ActionCategory::Breakthrough)?;
        assert_eq!(outcome.score, 1000);
        // The record keeps the computed delta; only the score is clamped.
        assert_eq!(outcome.record.points, 50);
        Ok(())
    }

    #[test]
    fn score_clamps_at_minimum() -> Result<(), LedgerError> {
        let mut ledger = ledger_with_score("Mel", 60)?;
        let outcome = record(&mut ledger, "Mel", ActionCategory::FalseClaim)?;
        assert_eq!(outcome.score, 0);
        Ok(())
    }

    #[test]
    fn fourth_positive_action_earns_streak_bonus() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        for _ in 0..3 {
            let outcome = record(&mut ledger, "Mel", ActionCategory::Documentation)?;
            assert_eq!(outcome.record.streak_bonus, 0);
        }
        let fourth = record(&mut ledger, "Mel", ActionCategory::Documentation)?;
        assert_eq!(fourth.record.streak_bonus, 10);
        assert_eq!(fourth.record.points, 15);
        Ok(())
    }

    #[test]
    fn streak_bonus_applies_to_penalties_too() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        for _ in 0..3 {
            record(&mut ledger, "Mel", ActionCategory::Documentation)?;
        }
        let penalty = record(&mut ledger, "Mel", ActionCategory::FalseClaim)?;
        assert_eq!(penalty.record.points, -90);
        Ok(())
    }

    #[test]
    fn peer_assist_raises_multiplier() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        record(&mut ledger, "Mel", ActionCategory::PeerAssist)?;
        let outcome = record(&mut ledger, "Mel", ActionCategory::Breakthrough)?;
        assert_eq!(outcome.record.points, 55);
        Ok(())
    }

    #[test]
    fn other_agents_assists_do_not_count() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        record(&mut ledger, "HyperDAGManager", ActionCategory::PeerAssist)?;
        let outcome = record(&mut ledger, "Mel", ActionCategory::Breakthrough)?;
        assert_eq!(outcome.record.points, 50);
        Ok(())
    }

    #[test]
    fn unknown_agent_changes_nothing() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let result = ledger.record_action("Nobody", ActionCategory::Breakthrough, "x", None);
        assert!(matches!(result, Err(LedgerError::UnknownAgent(name)) if name == "Nobody"));
        assert!(ledger.is_empty());
        assert!(ledger.agents().iter().all(|a| a.score == 500));
        Ok(())
    }

    #[test]
    fn category_missing_from_table_changes_nothing() -> Result<(), LedgerError> {
        let mut config = LedgerConfig::default();
        config.scoring.points.remove(&ActionCategory::OpportunityMatch);
        let mut ledger = Ledger::new(config)?;

        let result = ledger.record_action("Mel", ActionCategory::OpportunityMatch, "x", None);
        assert!(matches!(result, Err(LedgerError::UnknownCategory(_))));
        assert!(ledger.is_empty());
        assert_eq!(ledger.score("Mel")?, 500);
        Ok(())
    }

    #[test]
    fn named_category_parses_and_rejects() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let ok = ledger.record_action_named("Mel", "peer_assist", "helped", None)?;
        assert_eq!(ok.record.category, ActionCategory::PeerAssist);

        let bad = ledger.record_action_named("Mel", "world_peace", "x", None);
        assert!(matches!(bad, Err(LedgerError::UnknownCategory(name)) if name == "world_peace"));
        assert_eq!(ledger.len(), 1);
        Ok(())
    }

    #[test]
    fn named_action_checks_agent_before_category() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let result = ledger.record_action_named("Nobody", "bogus", "x", None);
        assert!(matches!(result, Err(LedgerError::UnknownAgent(name)) if name == "Nobody"));
        assert!(ledger.is_empty());
        Ok(())
    }

    #[test]
    fn evidence_is_stored_verbatim() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let evidence = Evidence::from([(
            String::from("dataset_size"),
            serde_json::Value::from(5000),
        )]);
        let outcome = ledger.record_action(
            "Mel",
            ActionCategory::Breakthrough,
            "scale",
            Some(evidence.clone()),
        )?;
        assert_eq!(outcome.record.evidence, evidence);
        Ok(())
    }

    #[test]
    fn timestamps_never_go_backwards() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let now = Utc::now();
        ledger.record_action_at("Mel", ActionCategory::Documentation, "a", None, now)?;
        let earlier = TimeDelta::try_seconds(30)
            .and_then(|delta| now.checked_sub_signed(delta))
            .unwrap_or(now);
        let outcome =
            ledger.record_action_at("Mel", ActionCategory::Documentation, "b", None, earlier)?;
        assert_eq!(outcome.record.timestamp, now);
        Ok(())
    }

    #[test]
    fn achievements_unlock_once() -> Result<(), LedgerError> {
        let mut ledger = ledger_with_score("Mel", 790)?;
        let first = record(&mut ledger, "Mel", ActionCategory::Collaboration)?;
        assert_eq!(first.score, 805);
        assert_eq!(first.unlocked, vec![Achievement::HarmonicMaster]);

        let second = record(&mut ledger, "Mel", ActionCategory::Documentation)?;
        assert!(second.unlocked.is_empty());
        assert_eq!(
            ledger.get_achievements("Mel")?,
            vec![Achievement::HarmonicMaster]
        );
        Ok(())
    }

    #[test]
    fn just_below_threshold_unlocks_nothing() -> Result<(), LedgerError> {
        let mut ledger = ledger_with_score("Mel", 780)?;
        let outcome = record(&mut ledger, "Mel", ActionCategory::Collaboration)?;
        assert_eq!(outcome.score, 795);
        assert!(outcome.unlocked.is_empty());
        assert!(ledger.get_achievements("Mel")?.is_empty());
        Ok(())
    }

    #[test]
    fn achievements_survive_score_drop() -> Result<(), LedgerError> {
        let mut ledger = ledger_with_score("Mel", 790)?;
        record(&mut ledger, "Mel", ActionCategory::Collaboration)?;
        record(&mut ledger, "Mel", ActionCategory::FalseClaim)?;
        assert!(ledger.score("Mel")? < 800);
        assert_eq!(
            ledger.get_achievements("Mel")?,
            vec![Achievement::HarmonicMaster]
        );
        Ok(())
    }

    #[test]
    fn fifth_breakthrough_unlocks_discovery_pioneer() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let mut unlocked = Vec::new();
        for _ in 0..5 {
            unlocked.extend(record(&mut ledger, "Mel", ActionCategory::Breakthrough)?.unlocked);
        }
        assert!(unlocked.contains(&Achievement::DiscoveryPioneer));
        Ok(())
    }

    #[test]
    fn get_achievements_unknown_agent() -> Result<(), LedgerError> {
        let ledger = ledger()?;
        assert!(matches!(
            ledger.get_achievements("Nobody"),
            Err(LedgerError::UnknownAgent(_))
        ));
        Ok(())
    }

    #[test]
    fn empty_ledger_leaderboard_has_zero_momentum() -> Result<(), LedgerError> {
        let report = ledger()?.get_leaderboard();
        assert!(report.momentum.abs() < f64::EPSILON);
        assert!((report.unity - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.rankings.len(), 3);
        assert_eq!(report.team.action_count, 0);
        Ok(())
    }

    #[test]
    fn long_mixed_sequence_keeps_invariants() -> Result<(), LedgerError> {
        let mut ledger = ledger()?;
        let agents = ["HyperDAGManager", "AI-Prompt-Manager", "Mel"];
        let mut held = [0_usize; 3];
        let categories = ActionCategory::ALL.iter().cycle().step_by(3);

        for (agent, category) in agents.iter().cycle().zip(categories).take(300) {
            record(&mut ledger, agent, *category)?;

            for (name, previous) in agents.iter().zip(held.iter_mut()) {
                assert!(ledger.score(name)? <= 1000);

                let count = ledger.get_achievements(name)?.len();
                assert!(count >= *previous);
                *previous = count;
            }

            let report = ledger.get_leaderboard();
            assert!((0.0..=1.0).contains(&report.unity));
            assert!((0.0..=1.0).contains(&report.momentum));
            assert!(
                report
                    .rankings
                    .windows(2)
                    .all(|w| matches!(w, [a, b] if a.score >= b.score))
            );
        }

        let sequences: Vec<u64> = ledger.history().iter().map(|r| r.sequence).collect();
        assert!(sequences.windows(2).all(|w| matches!(w, [a, b] if a < b)));
        Ok(())
    }
}
