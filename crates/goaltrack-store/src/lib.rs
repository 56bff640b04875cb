//! goaltrack Store
//!
//! Interfaces to the external collaborators:
//! - [`RemoteStore`]: the managed document store, partitioned by user id
//! - [`IdentityProvider`]: the managed identity provider
//!
//! plus in-memory implementations ([`MemoryStore`], [`StaticIdentity`]) for
//! tests and local demos.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod identity;
pub mod memory;
pub mod remote;

pub use error::{StoreError, StoreResult};
pub use identity::{IdentityProvider, StaticIdentity};
pub use memory::{MemoryStore, Partition, StoreOp};
pub use remote::{clamp_percent, RemoteStore};
