//! Plain-text digest of ranked wards.
//!
//! The output is a pure function of its inputs (no timestamps), which keeps
//! it usable as golden test output. Scores print with three decimals; the
//! PM2.5 and green cover values print in shortest round-trip form with a
//! trailing `.0` on whole numbers (`45.0`, `12.5`). Very large or small
//! values use a signed two-digit exponent (`1e+16`, `1.5e-05`) and NaN
//! prints as `nan`.

use std::fmt::Write as _;

use ward_map_ward_models::WardRecord;

use crate::RankingError;
use crate::ranking;

/// Formats a measurement in shortest round-trip form.
fn measurement(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }

    let text = format!("{value:?}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = exponent
        .strip_prefix('-')
        .map_or(('+', exponent), |digits| ('-', digits));
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Renders the digest for a ranked list and its single highest record.
#[must_use]
pub fn digest(top: &[&WardRecord], highest: &WardRecord) -> String {
    let mut out = format!(
        "Current ward data (top {} by priority score):\n",
        top.len()
    );

    for ward in top {
        let _ = writeln!(
            out,
            "- {}: Priority Score {:.3} (PM2.5: {}, Green Cover: {}%)",
            ward.ward_name,
            ward.priority_score,
            measurement(ward.pm25),
            measurement(ward.green_area),
        );
    }

    let _ = writeln!(
        out,
        "Highest priority ward: {} with score {:.3}.",
        highest.ward_name, highest.priority_score,
    );

    out
}

/// Ranks `records` and renders the digest of the top `n`.
///
/// # Errors
///
/// Returns [`RankingError::EmptySnapshot`] if `records` is empty.
pub fn digest_top(records: &[WardRecord], n: usize) -> Result<String, RankingError> {
    let highest = ranking::highest(records)?;
    let top = ranking::top_n(records, n);
    Ok(digest(&top, highest))
}
