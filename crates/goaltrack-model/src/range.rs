//! Inclusive calendar-day ranges for daily-log queries

use crate::validation::{self, ValidationError};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range
    ///
    /// # Errors
    /// `InvalidRange` when `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        let (start, end) = validation::date_range(start, end)?;
        Ok(Self { start, end })
    }

    /// A single day
    #[inline]
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The `days` days ending on `end`, inclusive
    #[must_use]
    pub fn ending_on(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        let start = end
            .checked_sub_signed(Duration::days(span))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Whether the range includes `date`
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the range
    #[inline]
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
