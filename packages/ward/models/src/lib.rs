#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ward record schema and numeric coercion rules.
//!
//! Both data sources (the live JSON-lines file and the static CSV fallback)
//! normalize their rows into the fixed [`WardRecord`] shape defined here.
//! Numeric fields arrive either as text or as JSON numbers; an empty or
//! missing value coerces to `0.0` and anything unparsable is rejected with
//! [`MalformedRecord`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column name of the ward identifier.
pub const WARD_NAME: &str = "ward_name";
/// Column name of the population count.
pub const POPULATION: &str = "Population";
/// Column name of the PM2.5 concentration.
pub const PM25: &str = "PM25";
/// Column name of the average temperature.
pub const AVG_TEMP: &str = "Avg_Temp";
/// Column name of the green cover percentage.
pub const GREEN_AREA: &str = "Green_Are";
/// Column name of the open land percentage.
pub const OPEN_LAND: &str = "Open_Land";
/// Column name of the precomputed priority score.
pub const PRIORITY_SCORE: &str = "Priority_Sci";
/// Column name of the priority category.
pub const PRIORITY_LEVEL: &str = "Priority_Level";

/// The six numeric columns, in schema order.
pub const NUMERIC_FIELDS: [&str; 6] = [
    POPULATION,
    PM25,
    AVG_TEMP,
    GREEN_AREA,
    OPEN_LAND,
    PRIORITY_SCORE,
];

/// One row of ward data.
///
/// Serialized with the source column names so the JSON payload matches the
/// CSV header and the live file's keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardRecord {
    /// Ward identifier, unique within a snapshot by convention.
    pub ward_name: String,
    /// Resident population.
    #[serde(rename = "Population")]
    pub population: f64,
    /// PM2.5 concentration.
    #[serde(rename = "PM25")]
    pub pm25: f64,
    /// Average temperature.
    #[serde(rename = "Avg_Temp")]
    pub avg_temp: f64,
    /// Green cover percentage.
    #[serde(rename = "Green_Are")]
    pub green_area: f64,
    /// Open land percentage.
    #[serde(rename = "Open_Land")]
    pub open_land: f64,
    /// Precomputed planning priority score.
    #[serde(rename = "Priority_Sci")]
    pub priority_score: f64,
    /// Priority category, passed through without validation.
    #[serde(rename = "Priority_Level")]
    pub priority_level: String,
}

/// A numeric or string field held an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record: field '{field}' has unusable value {value:?}")]
pub struct MalformedRecord {
    /// Column that failed to coerce.
    pub field: &'static str,
    /// The offending raw value.
    pub value: String,
}

/// A raw field value as it appears in a source row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    /// The column is absent (or JSON `null`).
    Missing,
    /// Textual value, as read from CSV or a JSON string.
    Text(&'a str),
    /// Already-numeric value from a JSON number.
    Number(f64),
    /// A JSON value of a type no column accepts (bool, array, object).
    Unsupported(&'a serde_json::Value),
}

impl<'a> From<Option<&'a serde_json::Value>> for RawValue<'a> {
    fn from(value: Option<&'a serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::Missing,
            Some(serde_json::Value::String(s)) => Self::Text(s),
            Some(v @ serde_json::Value::Number(n)) => {
                n.as_f64().map_or(Self::Unsupported(v), Self::Number)
            }
            Some(other) => Self::Unsupported(other),
        }
    }
}

/// Coerces a raw value into a float.
///
/// Missing and empty (or whitespace-only) text become `0.0`. Other text is
/// parsed after trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`MalformedRecord`] if the text does not parse as a float or the
/// value is of an unsupported JSON type.
pub fn coerce_number(field: &'static str, raw: RawValue<'_>) -> Result<f64, MalformedRecord> {
    match raw {
        RawValue::Missing => Ok(0.0),
        RawValue::Number(n) => Ok(n),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed.parse::<f64>().map_err(|_| MalformedRecord {
                field,
                value: s.to_string(),
            })
        }
        RawValue::Unsupported(v) => Err(MalformedRecord {
            field,
            value: v.to_string(),
        }),
    }
}

/// Coerces a raw value into a string, defaulting to empty when absent.
///
/// # Errors
///
/// Returns [`MalformedRecord`] for unsupported JSON types.
pub fn coerce_text(field: &'static str, raw: RawValue<'_>) -> Result<String, MalformedRecord> {
    match raw {
        RawValue::Missing => Ok(String::new()),
        RawValue::Text(s) => Ok(s.to_string()),
        RawValue::Number(n) => Ok(n.to_string()),
        RawValue::Unsupported(v) => Err(MalformedRecord {
            field,
            value: v.to_string(),
        }),
    }
}

impl WardRecord {
    /// Builds a record by looking up every schema column through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] for the first column that fails to coerce.
    pub fn from_lookup<'a, F>(lookup: F) -> Result<Self, MalformedRecord>
    where
        F: Fn(&str) -> RawValue<'a>,
    {
        Ok(Self {
            ward_name: coerce_text(WARD_NAME, lookup(WARD_NAME))?,
            population: coerce_number(POPULATION, lookup(POPULATION))?,
            pm25: coerce_number(PM25, lookup(PM25))?,
            avg_temp: coerce_number(AVG_TEMP, lookup(AVG_TEMP))?,
            green_area: coerce_number(GREEN_AREA, lookup(GREEN_AREA))?,
            open_land: coerce_number(OPEN_LAND, lookup(OPEN_LAND))?,
            priority_score: coerce_number(PRIORITY_SCORE, lookup(PRIORITY_SCORE))?,
            priority_level: coerce_text(PRIORITY_LEVEL, lookup(PRIORITY_LEVEL))?,
        })
    }

    /// Builds a record from a JSON object, ignoring keys outside the schema.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] if any schema column fails to coerce.
    pub fn from_json_object(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, MalformedRecord> {
        Self::from_lookup(|field| RawValue::from(object.get(field)))
    }

    /// Builds a record from CSV header/value pairs.
    ///
    /// Columns missing from `headers` (or short rows) count as missing values.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] if any schema column fails to coerce.
    pub fn from_text_columns(headers: &[String], values: &[&str]) -> Result<Self, MalformedRecord> {
        Self::from_lookup(|field| {
            headers
                .iter()
                .position(|h| h == field)
                .and_then(|i| values.get(i))
                .map_or(RawValue::Missing, |v| RawValue::Text(*v))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_missing_numbers_coerce_to_zero() {
        for field in NUMERIC_FIELDS {
            assert!(coerce_number(field, RawValue::Missing).unwrap().abs() < f64::EPSILON);
            assert!(coerce_number(field, RawValue::Text("")).unwrap().abs() < f64::EPSILON);
            assert!(coerce_number(field, RawValue::Text("  ")).unwrap().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn parses_well_formed_numbers() {
        let v = coerce_number(PM25, RawValue::Text("42.75")).unwrap();
        assert!((v - 42.75).abs() < f64::EPSILON);
        let v = coerce_number(PM25, RawValue::Text(" -3 ")).unwrap();
        assert!((v - -3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unparsable_numbers() {
        let err = coerce_number(PRIORITY_SCORE, RawValue::Text("high")).unwrap_err();
        assert_eq!(err.field, PRIORITY_SCORE);
        assert_eq!(err.value, "high");
    }

    #[test]
    fn csv_columns_fill_blanks_and_missing_columns() {
        let headers: Vec<String> = ["ward_name", "Population", "PM25", "Priority_Sci"]
            .iter()
            .map(|h| (*h).to_string())
            .collect();
        let record =
            WardRecord::from_text_columns(&headers, &["Ward 7", "", "31.5", "0.812"]).unwrap();

        assert_eq!(record.ward_name, "Ward 7");
        assert!(record.population.abs() < f64::EPSILON);
        assert!((record.pm25 - 31.5).abs() < f64::EPSILON);
        assert!(record.avg_temp.abs() < f64::EPSILON);
        assert!((record.priority_score - 0.812).abs() < f64::EPSILON);
        assert_eq!(record.priority_level, "");
    }

    #[test]
    fn json_object_accepts_numbers_and_strings() {
        let value = serde_json::json!({
            "ward_name": "Ward 3",
            "Population": 120_000,
            "PM25": "55.1",
            "Avg_Temp": null,
            "Green_Are": 12.5,
            "Open_Land": "",
            "Priority_Sci": 0.66,
            "Priority_Level": "High",
            "time": 1_700_000_000_000_u64,
            "diff": 1
        });
        let record = WardRecord::from_json_object(value.as_object().unwrap()).unwrap();

        assert!((record.population - 120_000.0).abs() < f64::EPSILON);
        assert!((record.pm25 - 55.1).abs() < f64::EPSILON);
        assert!(record.avg_temp.abs() < f64::EPSILON);
        assert!(record.open_land.abs() < f64::EPSILON);
        assert_eq!(record.priority_level, "High");
    }

    #[test]
    fn json_object_rejects_unsupported_types() {
        let value = serde_json::json!({ "ward_name": "Ward 1", "PM25": [1, 2] });
        let err = WardRecord::from_json_object(value.as_object().unwrap()).unwrap_err();
        assert_eq!(err.field, PM25);
    }

    #[test]
    fn serializes_with_source_column_names() {
        let record = WardRecord {
            ward_name: "A".to_string(),
            population: 1.0,
            pm25: 2.0,
            avg_temp: 3.0,
            green_area: 4.0,
            open_land: 5.0,
            priority_score: 0.9,
            priority_level: "High".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        for field in NUMERIC_FIELDS.iter().chain(&[WARD_NAME, PRIORITY_LEVEL]) {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
