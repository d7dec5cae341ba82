// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces and implementations of persistence layers for plenary
//! attendance records.
//!
//! The [`AttendanceStore`] trait is the only boundary between the attendance
//! core and storage. Records are addressed by their composite identity tuple
//! and the store enforces exactly one structural invariant: at most one
//! record per tuple, with the existence check and the insert forming one
//! atomic unit towards concurrent writers.
//!
//! Two backends are provided. [`MemoryStore`] keeps records in a hash map
//! behind a read-write lock and is suitable for tests and embedded usage.
//! With the `sqlite` feature (on by default) the [`sqlite`] module persists
//! records to a SQLite database via a connection pool, using a unique index
//! to enforce the identity invariant.

mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
mod traits;

pub use memory::{InnerMemoryStore, MemoryStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use traits::{AttendanceStore, ConfirmedFilter, StoreError};
