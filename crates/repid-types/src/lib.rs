//! Shared type definitions for the RepID reputation ledger.
//!
//! Types defined here are produced by the ledger and consumed by the session
//! runner and the engine binary. Report types also flow to `TypeScript` via
//! `ts-rs` so dashboards can read exported JSON reports.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for records and reports
//! - [`enums`] -- Action categories and achievements
//! - [`structs`] -- Action records, agent standings, leaderboard reports

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Achievement, ActionCategory, UnknownCategory};
pub use ids::{ActionId, ReportId};
pub use structs::{
    ActionRecord, AgentStanding, Evidence, LeaderboardReport, RankedAgent, RecordOutcome,
    TeamStats,
};
