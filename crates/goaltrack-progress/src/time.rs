//! Time-log summaries
//!
//! Shapes daily logs into per-activity and per-day series for display.

use chrono::NaiveDate;
use goaltrack_model::{ActivityId, DailyLog};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minutes logged against one activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTotal {
    /// Activity the minutes belong to
    pub activity_id: ActivityId,
    /// Denormalized name from the first log seen
    pub activity_name: String,
    /// Sum of logged minutes
    pub minutes: u64,
    /// Number of logs
    pub entries: usize,
}

/// Minutes logged on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    /// Calendar day
    pub date: NaiveDate,
    /// Minutes logged that day
    pub minutes: u64,
}

/// Total minutes per activity, largest first, ties broken by name
#[must_use]
pub fn minutes_by_activity(logs: &[DailyLog]) -> Vec<ActivityTotal> {
    let mut totals: IndexMap<&ActivityId, ActivityTotal> = IndexMap::new();

    for log in logs {
        let entry = totals.entry(&log.activity_id).or_insert_with(|| ActivityTotal {
            activity_id: log.activity_id.clone(),
            activity_name: log.activity_name.clone(),
            minutes: 0,
            entries: 0,
        });
        entry.minutes += u64::from(log.duration_minutes);
        entry.entries += 1;
    }

    let mut out: Vec<_> = totals.into_values().collect();
    out.sort_by(|a, b| {
        b.minutes
            .cmp(&a.minutes)
            .then_with(|| a.activity_name.cmp(&b.activity_name))
    });
    out
}

/// Minutes per day over an inclusive range, zero-filled
///
/// Logs outside the range are ignored; an inverted range yields nothing.
#[must_use]
pub fn minutes_by_day(logs: &[DailyLog], start: NaiveDate, end: NaiveDate) -> Vec<DayTotal> {
    let mut by_date: HashMap<NaiveDate, u64> = HashMap::new();
    for log in logs.iter().filter(|l| l.date >= start && l.date <= end) {
        *by_date.entry(log.date).or_default() += u64::from(log.duration_minutes);
    }

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| DayTotal {
            date,
            minutes: by_date.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Total minutes across logs
#[inline]
#[must_use]
pub fn total_minutes(logs: &[DailyLog]) -> u64 {
    logs.iter().map(|l| u64::from(l.duration_minutes)).sum()
}
