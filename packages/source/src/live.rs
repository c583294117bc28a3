//! Reader for the live JSON-lines file.
//!
//! Each non-blank line is one JSON object. Keys outside the ward schema are
//! ignored, except `diff`: a line whose `diff` is negative retracts the most
//! recent earlier record with the same `ward_name`. The file may be caught
//! mid-write, so a single bad line fails the whole read.

use std::path::{Path, PathBuf};

use ward_map_ward_models::WardRecord;

use crate::{SourceError, SourceKind, WardSource};

/// Bookkeeping key marking an insertion (`1`) or retraction (`-1`).
const DIFF_KEY: &str = "diff";

/// The live source backed by a JSON-lines file.
#[derive(Debug, Clone)]
pub struct LiveSource {
    path: PathBuf,
}

impl LiveSource {
    /// Creates a live source reading from `path`.
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

impl WardSource for LiveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn read(&self) -> Result<Vec<WardRecord>, SourceError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| SourceError::Unavailable {
                path: self.path.clone(),
                source,
            })?;

        let records = parse_lines(&contents)?;

        if records.is_empty() {
            return Err(SourceError::Empty {
                path: self.path.clone(),
            });
        }

        log::debug!(
            "Parsed {} records from {}",
            records.len(),
            self.path.display()
        );

        Ok(records)
    }
}

/// Parses JSON-lines content into records, applying retractions.
///
/// # Errors
///
/// Returns [`SourceError`] for the first line that is not a JSON object or
/// whose fields fail to coerce.
pub fn parse_lines(contents: &str) -> Result<Vec<WardRecord>, SourceError> {
    let mut records: Vec<WardRecord> = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|source| SourceError::Json {
                line: line_no,
                source,
            })?;
        let object = value
            .as_object()
            .ok_or(SourceError::NotAnObject { line: line_no })?;

        let record = WardRecord::from_json_object(object).map_err(|source| {
            SourceError::Malformed {
                row: line_no,
                source,
            }
        })?;

        let retraction = object
            .get(DIFF_KEY)
            .and_then(serde_json::Value::as_i64)
            .is_some_and(|diff| diff < 0);

        if retraction {
            if let Some(pos) = records
                .iter()
                .rposition(|r| r.ward_name == record.ward_name)
            {
                records.remove(pos);
            }
        } else {
            records.push(record);
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const TWO_WARDS: &str = concat!(
        r#"{"ward_name":"A","Population":1000,"PM25":40.5,"Avg_Temp":31,"Green_Are":12,"Open_Land":4,"Priority_Sci":0.9,"Priority_Level":"High","time":1,"diff":1}"#,
        "\n",
        r#"{"ward_name":"B","Population":"","PM25":"22","Avg_Temp":29,"Green_Are":30,"Open_Land":9,"Priority_Sci":0.4,"Priority_Level":"Low","time":1,"diff":1}"#,
        "\n",
    );

    #[test]
    fn parses_each_line_as_a_record() {
        let records = parse_lines(TWO_WARDS).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ward_name, "A");
        assert!(records[1].population.abs() < f64::EPSILON);
        assert!((records[1].pm25 - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn skips_blank_lines() {
        let contents = format!("\n{TWO_WARDS}\n   \n");
        assert_eq!(parse_lines(&contents).unwrap().len(), 2);
    }

    #[test]
    fn truncated_trailing_line_fails_whole_read() {
        let contents = format!("{TWO_WARDS}{{\"ward_name\":\"C\",\"PM2");
        let err = parse_lines(&contents).unwrap_err();
        assert!(matches!(err, SourceError::Json { line: 3, .. }), "{err}");
    }

    #[test]
    fn non_object_line_fails_whole_read() {
        let err = parse_lines("[1, 2, 3]\n").unwrap_err();
        assert!(matches!(err, SourceError::NotAnObject { line: 1 }));
    }

    #[test]
    fn malformed_numeric_field_fails_whole_read() {
        let contents = format!("{TWO_WARDS}{}\n", r#"{"ward_name":"C","PM25":"n/a"}"#);
        let err = parse_lines(&contents).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { row: 3, .. }));
    }

    #[test]
    fn negative_diff_retracts_earlier_record() {
        let contents = format!(
            "{TWO_WARDS}{}\n{}\n",
            r#"{"ward_name":"A","Priority_Sci":0.9,"diff":-1}"#,
            r#"{"ward_name":"A","Priority_Sci":0.95,"diff":1}"#,
        );
        let records = parse_lines(&contents).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.ward_name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        assert!((records[1].priority_score - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = LiveSource::new(dir.path().join("live_wards.jsonl"));
        assert!(matches!(
            source.read().unwrap_err(),
            SourceError::Unavailable { .. }
        ));
    }

    #[test]
    fn empty_file_is_reported_as_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file).unwrap();
        let source = LiveSource::new(file.path());
        assert!(matches!(source.read().unwrap_err(), SourceError::Empty { .. }));
    }

    #[test]
    fn reads_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_WARDS.as_bytes()).unwrap();
        let source = LiveSource::new(file.path());
        assert_eq!(source.kind(), SourceKind::Live);
        assert_eq!(source.read().unwrap().len(), 2);
    }
}
