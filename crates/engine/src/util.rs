//! Internal helpers for input validation and calendar math.
//!
//! These utilities centralize validation so every write path enforces the
//! same invariants.

use chrono::{Datelike, Months, NaiveDate};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, Money, ResultEngine};

/// Parses a `YYYY-MM-DD` calendar date.
///
/// Rejects impossible dates such as `2026-02-30`.
pub fn parse_transaction_date(field: &'static str, raw: &str) -> ResultEngine<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(field, "date is required"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        EngineError::validation(field, format!("'{trimmed}' is not a valid calendar date"))
    })
}

pub(crate) fn require_positive(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::validation("amount", "amount must be > 0"));
    }
    Ok(())
}

pub(crate) fn require_text(field: &'static str, value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(field, format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Collapses inner whitespace; the result is what gets stored and shown.
pub(crate) fn normalize_category_display(input: &str) -> ResultEngine<String> {
    let display = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if display.is_empty() {
        return Err(EngineError::validation(
            "category",
            "category name must not be empty",
        ));
    }
    Ok(display)
}

/// Uniqueness key for category names: accents stripped, case folded,
/// punctuation collapsed to single spaces.
pub(crate) fn normalize_category_key(display: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in display.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim_end();
    if normalized.is_empty() {
        return Err(EngineError::validation(
            "category",
            "category name must contain letters or digits",
        ));
    }
    Ok(normalized.to_string())
}

/// First and last day of a calendar month.
pub(crate) fn month_bounds(year: i32, month: u32) -> ResultEngine<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::validation("month", "month must be in 1..=12"));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::validation("year", "year out of range"))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| EngineError::validation("year", "year out of range"))?;
    Ok((first, last))
}

/// The `count` calendar months ending with `as_of`'s month, oldest first.
pub(crate) fn months_ending_at(as_of: NaiveDate, count: u32) -> ResultEngine<Vec<(i32, u32)>> {
    if count == 0 {
        return Err(EngineError::validation("months", "window must be at least 1 month"));
    }
    let anchor = as_of
        .with_day(1)
        .ok_or_else(|| EngineError::validation("as_of", "invalid date"))?;
    let mut months = Vec::with_capacity(count as usize);
    for back in (0..count).rev() {
        let month = anchor
            .checked_sub_months(Months::new(back))
            .ok_or_else(|| EngineError::validation("months", "window out of range"))?;
        months.push((month.year(), month.month()));
    }
    Ok(months)
}
