//! End-to-end session runs against default configuration.

use repid_core::config::RepIdConfig;
use repid_core::session::{SessionError, SessionScript, run_session};
use repid_types::Achievement;

#[test]
fn builtin_session_produces_expected_standings() -> Result<(), SessionError> {
    let report = run_session(&RepIdConfig::default(), &SessionScript::builtin())?;

    // 3 breakthroughs (+50 each), documentation and collaboration with the
    // streak bonus (+15, +25), then five opportunity matches at +35.
    assert_eq!(report.scores.get("HyperDAGManager"), Some(&865));
    assert_eq!(report.scores.get("Mel"), Some(&500));
    assert_eq!(report.actions.len(), 10);
    assert_eq!(report.opportunity_matches.len(), 5);
    assert_eq!(report.opportunities.len(), 5);
    assert_eq!(report.sustainability_potential, 2_675_000);

    assert_eq!(
        report.achievements.get("HyperDAGManager"),
        Some(&vec![Achievement::HarmonicMaster])
    );

    let leaderboard = &report.leaderboard;
    assert_eq!(
        leaderboard.rankings.first().map(|r| r.agent.as_str()),
        Some("HyperDAGManager")
    );
    assert_eq!(leaderboard.trends.get("HyperDAGManager"), Some(&365));
    assert_eq!(leaderboard.trends.get("Mel"), Some(&0));
    assert!((leaderboard.momentum - 1.0).abs() < f64::EPSILON);
    assert!(leaderboard.unity.abs() < f64::EPSILON);
    assert_eq!(leaderboard.team.total_score, 1865);
    assert_eq!(leaderboard.opportunities_available, 5);
    Ok(())
}

#[test]
fn session_without_opportunity_agent_skips_scan() -> Result<(), SessionError> {
    let mut script = SessionScript::builtin();
    script.opportunity_agent = None;

    let report = run_session(&RepIdConfig::default(), &script)?;
    assert!(report.opportunities.is_empty());
    assert!(report.opportunity_matches.is_empty());
    assert_eq!(report.sustainability_potential, 0);
    assert_eq!(report.leaderboard.opportunities_available, 0);
    assert_eq!(report.scores.get("HyperDAGManager"), Some(&690));
    Ok(())
}

#[test]
fn custom_roster_rejects_builtin_agent() {
    let config = RepIdConfig::parse("ledger:\n  agents: [Alpha, Beta]\n");
    assert!(config.is_ok(), "{config:?}");
    let Ok(config) = config else { return };

    let result = run_session(&config, &SessionScript::builtin());
    assert!(matches!(result, Err(SessionError::Step { step: 0, .. })));
}

#[test]
fn report_serializes_to_json() -> Result<(), SessionError> {
    let report = run_session(&RepIdConfig::default(), &SessionScript::builtin())?;
    let json = serde_json::to_value(&report).ok();
    let category = json
        .as_ref()
        .and_then(|v| v.pointer("/actions/0/category"))
        .and_then(serde_json::Value::as_str);
    assert_eq!(category, Some("breakthrough"));
    Ok(())
}

#[test]
fn shipped_config_matches_defaults() {
    let config = RepIdConfig::parse(include_str!("../../../repid-config.yaml"));
    assert!(config.is_ok(), "{config:?}");
    let Ok(config) = config else { return };
    let defaults = RepIdConfig::default();

    assert_eq!(config.ledger_config(), defaults.ledger_config());
    assert_eq!(config.opportunities, defaults.opportunities);
}

#[test]
fn peer_review_session_rewards_assisting_agent() -> Result<(), SessionError> {
    let script = SessionScript::parse(include_str!("../../../sessions/peer-review.yaml"))?;
    let report = run_session(&RepIdConfig::default(), &script)?;

    // Two assists lift Mel's breakthrough to 60 and each match to
    // floor(25 * 1.2) + 10 = 40.
    assert_eq!(report.name, "Peer_Review");
    assert_eq!(report.scores.get("Mel"), Some(&781));
    assert_eq!(report.scores.get("AI-Prompt-Manager"), Some(&535));
    assert_eq!(report.scores.get("HyperDAGManager"), Some(&425));
    assert_eq!(report.actions.len(), 11);

    let order: Vec<&str> = report
        .leaderboard
        .rankings
        .iter()
        .map(|r| r.agent.as_str())
        .collect();
    assert_eq!(order, ["Mel", "AI-Prompt-Manager", "HyperDAGManager"]);
    assert!(report.achievements.values().all(Vec::is_empty));
    Ok(())
}
