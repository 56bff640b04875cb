//! goaltrack Progress
//!
//! Pure derivations over cached documents:
//! - [`aggregate`]: per-goal `{total, done, percent}` from linked todos
//! - [`minutes_by_activity`] / [`minutes_by_day`]: time-log series
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use goaltrack_model::{Goal, GoalId, Todo, TodoId};
//! use goaltrack_progress::aggregate;
//!
//! let goals = vec![Goal::new(GoalId::new("g1"), "Ship", Utc::now())];
//! let mut done = Todo::new(TodoId::new("t1"), "write", Some(GoalId::new("g1")), Utc::now());
//! done.is_done = true;
//! let open = Todo::new(TodoId::new("t2"), "test", Some(GoalId::new("g1")), Utc::now());
//!
//! let progress = aggregate(&goals, &[done, open]);
//! assert_eq!(progress[&GoalId::new("g1")].percent, 50);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod aggregate;
mod time;

pub use aggregate::{
    aggregate, overall, percent, progress_for, GoalProgress, OverallProgress, ProgressMap,
};
pub use time::{minutes_by_activity, minutes_by_day, total_minutes, ActivityTotal, DayTotal};
