//! Configuration, opportunity board, and session orchestration for RepID.
//!
//! This crate sits between the ledger and the engine binary: it loads
//! `repid-config.yaml`, surfaces funding opportunities, and replays
//! scripted sessions into a fresh ledger.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `repid-config.yaml` into
//!   strongly-typed structs.
//! - [`opportunity`] -- Opportunity catalog scan and keyword matching.
//! - [`session`] -- [`SessionScript`] replay and [`SessionReport`].
//!
//! [`SessionScript`]: session::SessionScript
//! [`SessionReport`]: session::SessionReport

pub mod config;
pub mod opportunity;
pub mod session;
