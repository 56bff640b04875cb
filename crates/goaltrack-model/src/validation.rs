//! Client-side input validation
//!
//! Everything here runs before a write is issued; a rejected input never
//! reaches the remote store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Input limits applied before persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum characters in a goal/todo title or activity name
    pub max_title_len: usize,
    /// Maximum characters in daily log notes
    pub max_notes_len: usize,
    /// Maximum titles in one bulk todo insert
    pub max_bulk_todos: usize,
    /// Maximum minutes in a single daily log
    pub max_minutes_per_log: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_title_len: 200,
            max_notes_len: 1000,
            max_bulk_todos: 50,
            max_minutes_per_log: 24 * 60,
        }
    }
}

/// Rejected user input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Required text is blank
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Text exceeds its limit
    #[error("{field} is too long ({len} > {max} characters)")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Duration is NaN, infinite, zero or negative
    #[error("duration must be a positive number of minutes, got {0}")]
    InvalidDuration(f64),

    /// Duration exceeds the per-log maximum
    #[error("duration of {minutes} minutes exceeds the {max} minute limit")]
    DurationTooLong { minutes: u32, max: u32 },

    /// Bulk insert larger than allowed
    #[error("too many items in one batch ({count} > {max})")]
    BatchTooLarge { count: usize, max: usize },

    /// Date range with start after end
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Patch that changes nothing
    #[error("update contains no fields")]
    EmptyPatch,
}

fn checked_text(field: &'static str, raw: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(trimmed.to_string())
}

/// Validate a goal or todo title, returning it trimmed
///
/// # Errors
/// `Empty` for blank input, `TooLong` past `limits.max_title_len`
pub fn title(raw: &str, limits: &Limits) -> Result<String, ValidationError> {
    checked_text("title", raw, limits.max_title_len)
}

/// Validate an activity name, returning it trimmed
///
/// # Errors
/// `Empty` for blank input, `TooLong` past `limits.max_title_len`
pub fn activity_name(raw: &str, limits: &Limits) -> Result<String, ValidationError> {
    checked_text("activity name", raw, limits.max_title_len)
}

/// Validate optional notes; blank notes become `None`
///
/// # Errors
/// `TooLong` past `limits.max_notes_len`
pub fn notes(raw: Option<&str>, limits: &Limits) -> Result<Option<String>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => checked_text("notes", text, limits.max_notes_len).map(Some),
    }
}

/// Validate a duration typed by the user
///
/// Fractional minutes round to the nearest whole minute.
///
/// # Errors
/// `InvalidDuration` for non-finite, non-positive or sub-half-minute input,
/// `DurationTooLong` past `limits.max_minutes_per_log`
pub fn duration_minutes(raw: f64, limits: &Limits) -> Result<u32, ValidationError> {
    if !raw.is_finite() || raw <= 0.0 {
        return Err(ValidationError::InvalidDuration(raw));
    }
    let rounded = raw.round();
    if rounded < 1.0 {
        return Err(ValidationError::InvalidDuration(raw));
    }
    let max = limits.max_minutes_per_log;
    if rounded > f64::from(max) {
        // saturating cast, the value is already known to be out of range
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let minutes = rounded.min(f64::from(u32::MAX)) as u32;
        return Err(ValidationError::DurationTooLong { minutes, max });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minutes = rounded as u32;
    Ok(minutes)
}

/// Validate a list of titles for a bulk insert
///
/// Blank lines are skipped.
///
/// # Errors
/// `Empty` when nothing is left, `BatchTooLarge` past `limits.max_bulk_todos`,
/// or the first failing title
pub fn bulk_titles<S: AsRef<str>>(raw: &[S], limits: &Limits) -> Result<Vec<String>, ValidationError> {
    let titles = raw
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| !t.trim().is_empty())
        .map(|t| title(t, limits))
        .collect::<Result<Vec<_>, _>>()?;

    if titles.is_empty() {
        return Err(ValidationError::Empty { field: "titles" });
    }
    if titles.len() > limits.max_bulk_todos {
        return Err(ValidationError::BatchTooLarge {
            count: titles.len(),
            max: limits.max_bulk_todos,
        });
    }
    Ok(titles)
}

/// Validate an inclusive date range
///
/// # Errors
/// `InvalidRange` when `start > end`
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    if start > end {
        return Err(ValidationError::InvalidRange { start, end });
    }
    Ok((start, end))
}
