//! Typed record identifiers
//!
//! Every collection gets its own string newtype so a `TodoId` can never be
//! passed where a `GoalId` is expected. Ids minted on the client before the
//! remote store confirms a write are *temporary*: they carry the reserved
//! [`TEMP_PREFIX`] followed by a ULID.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Prefix reserved for client-side provisional ids
pub const TEMP_PREFIX: &str = "temp-";

/// Behaviour shared by all record ids
pub trait RecordId: Clone + fmt::Debug + fmt::Display + PartialEq + Eq + std::hash::Hash {
    /// Borrow the raw id string
    fn as_str(&self) -> &str;

    /// Mint a fresh provisional id
    fn temporary() -> Self;

    /// Whether this id was minted locally and not yet confirmed
    #[inline]
    fn is_temporary(&self) -> bool {
        self.as_str().starts_with(TEMP_PREFIX)
    }
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an existing id string
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a server-style id (bare ULID)
            #[inline]
            #[must_use]
            pub fn generate() -> Self {
                Self(Ulid::new().to_string())
            }
        }

        impl RecordId for $name {
            #[inline]
            fn as_str(&self) -> &str {
                &self.0
            }

            #[inline]
            fn temporary() -> Self {
                Self(format!("{}{}", TEMP_PREFIX, Ulid::new()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

record_id!(
    /// Goal document id
    GoalId
);
record_id!(
    /// Todo document id
    TodoId
);
record_id!(
    /// Activity document id
    ActivityId
);
record_id!(
    /// Daily log document id
    DailyLogId
);
record_id!(
    /// Opaque user id issued by the identity provider
    UserId
);
