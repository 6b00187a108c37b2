//! Funding opportunity board: a configured catalog of grants, prizes and
//! hackathons, filtered by relevance and matched against discovery topics.
//!
//! Matching is keyword based. A (opportunity, discovery) pair scores
//! `keyword_weight` for every requirement that contains any word of the
//! discovery, compared case-insensitively. Matches feed `opportunity_match`
//! actions into the ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A grant, prize, or hackathon that discoveries can be matched to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Display title.
    pub title: String,
    /// Issuing organization.
    pub source: String,
    /// Submission deadline.
    pub deadline: NaiveDate,
    /// Prize or grant amount in dollars, when published.
    #[serde(default)]
    pub prize_amount: Option<u64>,
    /// Catalog relevance score in `[0, 1]`.
    pub match_score: f64,
    /// Free-text requirements matched against discovery keywords.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Where to apply.
    pub url: String,
    /// When the last scan surfaced this opportunity.
    #[serde(default)]
    pub discovered_at: Option<DateTime<Utc>>,
}

/// A recommended pairing of a discovery with an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityMatch {
    /// Title of the matched opportunity.
    pub title: String,
    /// The discovery topic that matched.
    pub discovery: String,
    /// Keyword score, a multiple of `keyword_weight`.
    pub score: f64,
    /// The opportunity's prize amount, if known.
    pub prize_amount: Option<u64>,
}

/// Opportunity catalog and matching parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityConfig {
    /// Catalog entries below this relevance are dropped by a scan
    /// (default: 0.8).
    pub min_match_score: f64,
    /// Maximum recommendations returned (default: 5).
    pub max_matches: usize,
    /// Score added per matching requirement (default: 0.3).
    pub keyword_weight: f64,
    /// Discovery topics to match against the catalog.
    pub discoveries: Vec<String>,
    /// Known opportunities.
    pub catalog: Vec<Opportunity>,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            min_match_score: 0.8,
            max_matches: 5,
            keyword_weight: 0.3,
            discoveries: default_discoveries(),
            catalog: default_catalog(),
        }
    }
}

impl OpportunityConfig {
    /// Check matching parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for relevance scores outside
    /// `[0, 1]` or a non-positive keyword weight.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_match_score) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "opportunities.min_match_score must be within [0, 1], got {}",
                    self.min_match_score
                ),
            });
        }
        if !self.keyword_weight.is_finite() || self.keyword_weight <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "opportunities.keyword_weight must be positive, got {}",
                    self.keyword_weight
                ),
            });
        }
        if let Some(entry) = self
            .catalog
            .iter()
            .find(|entry| !(0.0..=1.0).contains(&entry.match_score))
        {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "opportunity {:?} has match_score {} outside [0, 1]",
                    entry.title, entry.match_score
                ),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OpportunityBoard
// ---------------------------------------------------------------------------

/// The set of opportunities currently considered relevant.
#[derive(Debug, Clone)]
pub struct OpportunityBoard {
    config: OpportunityConfig,
    current: Vec<Opportunity>,
}

impl OpportunityBoard {
    /// Create a board with nothing scanned yet.
    pub const fn new(config: OpportunityConfig) -> Self {
        Self {
            config,
            current: Vec::new(),
        }
    }

    /// Opportunities surfaced by the last scan.
    pub fn current(&self) -> &[Opportunity] {
        &self.current
    }

    /// Refresh the board from the catalog, keeping entries at or above
    /// `min_match_score` and stamping them with `now`.
    pub fn scan(&mut self, now: DateTime<Utc>) -> &[Opportunity] {
        let threshold = self.config.min_match_score;
        self.current = self
            .config
            .catalog
            .iter()
            .filter(|entry| entry.match_score >= threshold)
            .cloned()
            .map(|mut entry| {
                entry.discovered_at = Some(now);
                entry
            })
            .collect();

        info!(
            catalog = self.config.catalog.len(),
            relevant = self.current.len(),
            "Opportunity scan complete"
        );
        for entry in &self.current {
            debug!(
                title = %entry.title,
                prize_amount = ?entry.prize_amount,
                match_score = entry.match_score,
                "Relevant opportunity"
            );
        }

        &self.current
    }

    /// Rank (opportunity, discovery) pairs by keyword overlap.
    ///
    /// Pairs scoring zero are dropped. Results are sorted by score
    /// descending; equal scores keep board-then-discovery order. At most
    /// `max_matches` are returned.
    pub fn recommend(&self, discoveries: &[String]) -> Vec<OpportunityMatch> {
        let mut matches: Vec<OpportunityMatch> = self
            .current
            .iter()
            .flat_map(|entry| {
                discoveries.iter().filter_map(move |discovery| {
                    let hits = requirement_hits(&entry.requirements, discovery);
                    (hits > 0).then(|| OpportunityMatch {
                        title: entry.title.clone(),
                        discovery: discovery.clone(),
                        score: self.config.keyword_weight * f64::from(hits),
                        prize_amount: entry.prize_amount,
                    })
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(self.config.max_matches);
        matches
    }

    /// Recommend against the configured discovery topics.
    pub fn recommend_configured(&self) -> Vec<OpportunityMatch> {
        self.recommend(&self.config.discoveries)
    }

    /// Sum of known prize amounts on the board.
    pub fn total_prize_potential(&self) -> u64 {
        self.current
            .iter()
            .filter_map(|entry| entry.prize_amount)
            .fold(0_u64, u64::saturating_add)
    }
}

/// Number of requirements containing any word of `discovery`.
fn requirement_hits(requirements: &[String], discovery: &str) -> u32 {
    let keywords: Vec<String> = discovery
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let hits = requirements
        .iter()
        .filter(|requirement| {
            let requirement = requirement.to_lowercase();
            keywords.iter().any(|keyword| requirement.contains(keyword.as_str()))
        })
        .count();
    u32::try_from(hits).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_discoveries() -> Vec<String> {
    [
        "musical mathematics",
        "riemann zeros",
        "harmonic analysis",
        "consciousness emergence",
        "graph theory",
        "pattern discovery",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn catalog_entry(
    title: &str,
    source: &str,
    deadline: (i32, u32, u32),
    prize_amount: u64,
    match_score: f64,
    requirements: [&str; 3],
    url: &str,
) -> Option<Opportunity> {
    Some(Opportunity {
        title: title.to_owned(),
        source: source.to_owned(),
        deadline: NaiveDate::from_ymd_opt(deadline.0, deadline.1, deadline.2)?,
        prize_amount: Some(prize_amount),
        match_score,
        requirements: requirements.into_iter().map(String::from).collect(),
        url: url.to_owned(),
        discovered_at: None,
    })
}

fn default_catalog() -> Vec<Opportunity> {
    [
        catalog_entry(
            "NSF Quantum Leap Challenge: Mathematical Foundations",
            "NSF",
            (2025, 12, 1),
            2_000_000,
            0.95,
            ["Mathematical breakthrough", "Quantum applications", "Statistical validation"],
            "https://nsf.gov/quantum-leap-math",
        ),
        catalog_entry(
            "Templeton Foundation: Consciousness and Mathematics",
            "Templeton",
            (2025, 10, 15),
            500_000,
            0.92,
            ["Consciousness research", "Mathematical modeling", "Interdisciplinary approach"],
            "https://templeton.org/consciousness-math",
        ),
        catalog_entry(
            "FQXi: Emergence in Complex Systems",
            "FQXi",
            (2025, 9, 30),
            100_000,
            0.88,
            ["Emergence studies", "Complex systems", "Novel approaches"],
            "https://fqxi.org/emergence-challenge",
        ),
        catalog_entry(
            "Kaggle: Prime Number Pattern Challenge",
            "Kaggle",
            (2025, 8, 30),
            50_000,
            0.96,
            ["Prime number analysis", "Pattern discovery", "Machine learning"],
            "https://kaggle.com/prime-patterns",
        ),
        catalog_entry(
            "MIT AI Hackathon: Mathematical Discovery",
            "MIT",
            (2025, 9, 15),
            25_000,
            0.89,
            ["AI applications", "Mathematical discovery", "Innovation"],
            "https://mit.edu/ai-math-hackathon",
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, match_score: f64, requirements: &[&str]) -> Opportunity {
        Opportunity {
            title: title.to_owned(),
            source: String::from("test"),
            deadline: NaiveDate::MIN,
            prize_amount: Some(1000),
            match_score,
            requirements: requirements.iter().map(|r| (*r).to_owned()).collect(),
            url: String::from("https://example.org"),
            discovered_at: None,
        }
    }

    fn board(catalog: Vec<Opportunity>) -> OpportunityBoard {
        OpportunityBoard::new(OpportunityConfig {
            catalog,
            ..OpportunityConfig::default()
        })
    }

    #[test]
    fn scan_filters_low_relevance_and_stamps_time() {
        let mut board = board(vec![
            entry("keep", 0.8, &[]),
            entry("drop", 0.79, &[]),
        ]);
        let now = Utc::now();
        let titles: Vec<String> = board.scan(now).iter().map(|o| o.title.clone()).collect();
        assert_eq!(titles, vec!["keep"]);
        assert_eq!(board.current().first().and_then(|o| o.discovered_at), Some(now));
    }

    #[test]
    fn recommend_scores_each_matching_requirement() {
        let mut board = board(vec![entry(
            "grant",
            0.9,
            &["Mathematical modeling", "Mathematical discovery", "Art"],
        )]);
        board.scan(Utc::now());

        let matches = board.recommend(&[String::from("mathematical modeling")]);
        assert_eq!(matches.len(), 1);
        let score = matches.first().map_or(0.0, |m| m.score);
        assert!((score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn keyword_matches_as_substring_only() {
        let requirements = vec![String::from("Mathematical modeling")];
        // "mathematics" is not a substring of "mathematical".
        assert_eq!(requirement_hits(&requirements, "musical mathematics"), 0);
        assert_eq!(requirement_hits(&requirements, "MATHEMATICAL proof"), 1);
    }

    #[test]
    fn recommend_drops_zero_scores_and_sorts() {
        let mut board = board(vec![
            entry("one", 0.9, &["Graph theory"]),
            entry("two", 0.9, &["Graph work", "Theory of graphs"]),
        ]);
        board.scan(Utc::now());

        let matches = board.recommend(&[String::from("graph theory"), String::from("botany")]);
        let titles: Vec<&str> = matches.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["two", "one"]);
    }

    #[test]
    fn recommend_truncates_to_max_matches() {
        let catalog = (0..10)
            .map(|i| entry(&format!("opp {i}"), 0.9, &["Pattern discovery"]))
            .collect();
        let mut board = board(catalog);
        board.scan(Utc::now());
        assert_eq!(board.recommend_configured().len(), 5);
    }

    #[test]
    fn recommend_before_scan_is_empty() {
        let board = OpportunityBoard::new(OpportunityConfig::default());
        assert!(board.recommend_configured().is_empty());
        assert_eq!(board.total_prize_potential(), 0);
    }

    #[test]
    fn default_catalog_scans_fully() {
        let mut board = OpportunityBoard::new(OpportunityConfig::default());
        assert_eq!(board.scan(Utc::now()).len(), 5);
        assert_eq!(board.total_prize_potential(), 2_675_000);
        assert!(!board.recommend_configured().is_empty());
    }

    #[test]
    fn invalid_keyword_weight_rejected() {
        let config = OpportunityConfig {
            keyword_weight: 0.0,
            ..OpportunityConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
