//! Field rules shared by the schema: price precision, tier ordering, identifiers.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;
use validator::ValidationError;

use super::{issue, FieldIssue, FieldPath, REQUIRED};
use crate::models::TieredAndVolumeRow;

/// Error code attached to malformed or over-precise price strings.
pub const PRECISION_OR_FORMAT: &str = "precision_or_format";

pub const TIER_ORDER: &str = "tier_order";

static EXTERNAL_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9\-_]+$").expect("external id pattern is valid"));

/// `true` when `value` is a finite number with at most `precision` fraction digits.
///
/// A comma decimal separator is accepted and treated as a period.
pub fn precision_validation(value: &str, precision: usize) -> bool {
    let normalized = value.replacen(',', ".", 1);
    is_valid_number(&normalized) && is_precise(&normalized, precision)
}

fn is_valid_number(value: &str) -> bool {
    value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

fn is_precise(value: &str, precision: usize) -> bool {
    match value.split_once('.') {
        None => true,
        Some((_, fraction)) => fraction.len() <= precision,
    }
}

/// Canonical decimal rendering of a price string (`"12,5"` → `"12.5"`).
///
/// Returns `None` when the string is not a plain decimal, or when rendering it
/// would add fraction digits. Exponent notation is never expanded.
pub fn canonical_price(value: &str) -> Option<String> {
    let normalized = value.replacen(',', ".", 1);
    let decimal = Decimal::from_str(&normalized).ok()?;
    let fraction_digits = normalized.split_once('.').map_or(0, |(_, f)| f.len());
    (decimal.scale() as usize <= fraction_digits).then(|| decimal.to_string())
}

fn precision_error(precision: usize) -> ValidationError {
    let mut err = ValidationError::new(PRECISION_OR_FORMAT);
    err.message = Some(Cow::Owned(format!(
        "Price must be defined and have a maximum of {} decimal places",
        precision
    )));
    err.add_param(Cow::Borrowed("precision"), &precision);
    err
}

pub fn price_precision_2(value: &str) -> Result<(), ValidationError> {
    if precision_validation(value, 2) {
        Ok(())
    } else {
        Err(precision_error(2))
    }
}

pub fn price_precision_8(value: &str) -> Result<(), ValidationError> {
    if precision_validation(value, 8) {
        Ok(())
    } else {
        Err(precision_error(8))
    }
}

fn required_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(REQUIRED);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn plan_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(required_error("Name is required"))
    } else {
        Ok(())
    }
}

pub fn external_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(required_error("API Name is required"))
    } else if EXTERNAL_ID_REGEX.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("external_id");
        err.message = Some(Cow::Borrowed(
            "Only lowercase alphanumeric characters, dashes and underscores are allowed",
        ));
        Err(err)
    }
}

/// Tier boundaries: row 0 starts at zero, every later row starts strictly higher.
pub fn check_tier_order(rows: &[TieredAndVolumeRow], path: &FieldPath, issues: &mut Vec<FieldIssue>) {
    let rows_path = path.key("rows");

    let Some(first) = rows.first() else {
        issues.push(issue(
            &rows_path,
            TIER_ORDER,
            "At least one tier is required",
        ));
        return;
    };

    if first.first_unit != 0 {
        issues.push(issue(
            &rows_path.index(0).key("firstUnit"),
            TIER_ORDER,
            "First unit of first row must be zero",
        ));
    }

    for (i, pair) in rows.windows(2).enumerate() {
        if pair[1].first_unit <= pair[0].first_unit {
            issues.push(issue(
                &rows_path.index(i + 1).key("firstUnit"),
                TIER_ORDER,
                "First unit must be higher than the previous row",
            ));
        }
    }
}
