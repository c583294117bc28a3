//! Reader for the static CSV fallback.
//!
//! The header row names the schema columns; columns may appear in any order
//! and short rows are tolerated (missing cells coerce like blanks). Only
//! header names are trimmed. Text cells keep their whitespace, the same as
//! the live reader.

use std::io::Read;
use std::path::{Path, PathBuf};

use ward_map_ward_models::WardRecord;

use crate::{SourceError, SourceKind, WardSource};

/// The static source backed by a CSV file.
#[derive(Debug, Clone)]
pub struct StaticSource {
    path: PathBuf,
}

impl StaticSource {
    /// Creates a static source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WardSource for StaticSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Static
    }

    fn read(&self) -> Result<Vec<WardRecord>, SourceError> {
        let file = std::fs::File::open(&self.path).map_err(|source| SourceError::Unavailable {
            path: self.path.clone(),
            source,
        })?;

        let records = parse_csv(file)?;

        log::debug!(
            "Parsed {} records from CSV at {}",
            records.len(),
            self.path.display()
        );

        Ok(records)
    }
}

/// Parses CSV content with a header row into records.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the CSV is unreadable, or
/// [`SourceError::Malformed`] for the first row with an unparsable value.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<WardRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

    let mut records = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row = result?;
        let values: Vec<&str> = row.iter().collect();
        let record = WardRecord::from_text_columns(&headers, &values)
            .map_err(|source| SourceError::Malformed {
                row: idx + 1,
                source,
            })?;
        records.push(record);
    }

    Ok(records)
}
