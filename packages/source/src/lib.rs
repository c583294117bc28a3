#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ward data sources and per-request source selection.
//!
//! Two sources can answer a request: the live JSON-lines file that the
//! ingestion process keeps overwriting, and the static CSV file it was
//! built from. Each implements [`WardSource`]. The [`selector::SourceSelector`]
//! re-evaluates on every call which one to use, preferring live data and
//! falling back to the CSV whenever the live file is missing, empty, or
//! corrupt.

pub mod fallback;
pub mod live;
pub mod selector;

use std::path::PathBuf;

use strum_macros::{AsRefStr, Display};
use ward_map_ward_models::{MalformedRecord, WardRecord};

/// Default location of the live JSON-lines file.
pub const DEFAULT_LIVE_PATH: &str = "data/live_wards.jsonl";

/// Default location of the static CSV fallback.
pub const DEFAULT_FALLBACK_PATH: &str = "data/ward_priority.csv";

/// Errors that can occur while reading a ward source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source file could not be opened or read.
    #[error("Source file {} unavailable: {source}", .path.display())]
    Unavailable {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A live-source line was not valid JSON.
    #[error("Invalid JSON on line {line}: {source}")]
    Json {
        /// 1-based line number.
        line: usize,
        /// Underlying parse failure.
        source: serde_json::Error,
    },

    /// A live-source line was valid JSON but not an object.
    #[error("Line {line} is not a JSON object")]
    NotAnObject {
        /// 1-based line number.
        line: usize,
    },

    /// The CSV file could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row held a value the record schema rejects.
    #[error("Row {row}: {source}")]
    Malformed {
        /// 1-based data row (or line) number.
        row: usize,
        /// The coercion failure.
        source: MalformedRecord,
    },

    /// The source was readable but held no records.
    #[error("Source file {} contains no records", .path.display())]
    Empty {
        /// Path that was read.
        path: PathBuf,
    },
}

/// Which source produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    /// The continuously updated JSON-lines file.
    Live,
    /// The static CSV fallback.
    Static,
}

/// The records produced by one read of one source.
///
/// Built fresh for every request and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Source the records came from.
    pub origin: SourceKind,
    /// Records in source order.
    pub records: Vec<WardRecord>,
}

/// A readable source of ward records.
pub trait WardSource: Send + Sync {
    /// Returns which kind of source this is.
    fn kind(&self) -> SourceKind;

    /// Reads the complete record set.
    ///
    /// Implementations never return a partial list: any failure fails
    /// the whole read.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source cannot be read or any row is
    /// malformed.
    fn read(&self) -> Result<Vec<WardRecord>, SourceError>;
}

/// File locations of the two sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// Live JSON-lines file written by the ingestion process.
    pub live: PathBuf,
    /// Static CSV fallback.
    pub fallback: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            live: PathBuf::from(DEFAULT_LIVE_PATH),
            fallback: PathBuf::from(DEFAULT_FALLBACK_PATH),
        }
    }
}

impl SourcePaths {
    /// Reads `WARD_LIVE_PATH` and `WARD_FALLBACK_PATH`, using the defaults
    /// for unset variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            live: std::env::var("WARD_LIVE_PATH").map_or(defaults.live, PathBuf::from),
            fallback: std::env::var("WARD_FALLBACK_PATH").map_or(defaults.fallback, PathBuf::from),
        }
    }
}
