//! goaltrack Model
//!
//! Documents stored in a user's partition of the remote store, their typed
//! ids, and the validation applied to user input before any write.
//!
//! # Example
//!
//! ```rust
//! use goaltrack_model::{validation, Limits, RecordId, TodoId};
//!
//! let id = TodoId::temporary();
//! assert!(id.is_temporary());
//!
//! let limits = Limits::default();
//! assert!(validation::duration_minutes(-5.0, &limits).is_err());
//! assert_eq!(validation::title(" Read ", &limits).unwrap(), "Read");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod entity;
pub mod ids;
pub mod range;
pub mod validation;

pub use entity::{
    Activity, Collection, DailyLog, DailyLogPatch, Goal, NewDailyLog, Record, Todo, UserProfile,
};
pub use ids::{ActivityId, DailyLogId, GoalId, RecordId, TodoId, UserId, TEMP_PREFIX};
pub use range::DateRange;
pub use validation::{Limits, ValidationError};
