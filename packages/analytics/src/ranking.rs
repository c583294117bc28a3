//! Highest-priority and top-N selection.
//!
//! Keys compare with standard float ordering, except that `NaN` ranks below
//! every number. Record coercion never produces `NaN` from blank cells, but
//! a literal `"NaN"` in a source file still parses, so the ordering has to
//! be total. Among equal keys the record seen first in snapshot order wins.

use std::cmp::Ordering;

use ward_map_ward_models::WardRecord;

use crate::RankingError;

/// Extracts the priority score used for ranking.
#[must_use]
pub const fn priority_key(record: &WardRecord) -> f64 {
    record.priority_score
}

/// Orders two keys ascending, treating `NaN` as the smallest value.
#[must_use]
pub fn compare_keys(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Returns the record with the largest key, preferring the earliest on ties.
///
/// # Errors
///
/// Returns [`RankingError::EmptySnapshot`] if `records` is empty.
pub fn highest_by<F>(records: &[WardRecord], key: F) -> Result<&WardRecord, RankingError>
where
    F: Fn(&WardRecord) -> f64,
{
    let mut iter = records.iter();
    let first = iter.next().ok_or(RankingError::EmptySnapshot)?;

    Ok(iter.fold(first, |best, record| {
        if compare_keys(key(record), key(best)) == Ordering::Greater {
            record
        } else {
            best
        }
    }))
}

/// Returns up to `n` records sorted by descending key.
///
/// The sort is stable, so records with equal keys keep their snapshot order.
#[must_use]
pub fn top_n_by<F>(records: &[WardRecord], n: usize, key: F) -> Vec<&WardRecord>
where
    F: Fn(&WardRecord) -> f64,
{
    let mut ranked: Vec<&WardRecord> = records.iter().collect();
    ranked.sort_by(|a, b| compare_keys(key(b), key(a)));
    ranked.truncate(n);
    ranked
}

/// Returns the highest-priority record.
///
/// # Errors
///
/// Returns [`RankingError::EmptySnapshot`] if `records` is empty.
pub fn highest(records: &[WardRecord]) -> Result<&WardRecord, RankingError> {
    highest_by(records, priority_key)
}

/// Returns the `n` highest-priority records in descending order.
#[must_use]
pub fn top_n(records: &[WardRecord], n: usize) -> Vec<&WardRecord> {
    top_n_by(records, n, priority_key)
}
