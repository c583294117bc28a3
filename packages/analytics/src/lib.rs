#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Priority ranking and digest rendering over ward snapshots.
//!
//! [`ranking`] answers "which ward is most urgent" and "which are the top N"
//! with deterministic tie-breaking. [`summary`] renders a ranked subset into
//! the plain-text digest served to the LLM as context.

pub mod ranking;
pub mod summary;

use thiserror::Error;

/// Errors that can occur during ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RankingError {
    /// The snapshot holds no records.
    #[error("Snapshot contains no records")]
    EmptySnapshot,
}
