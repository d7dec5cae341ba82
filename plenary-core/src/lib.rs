// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core data types shared across the plenary stack: identifiers for users,
//! events and tracks, the attendance record with its composite identity, and
//! the fixed role catalog.
//!
//! An attendance record states that a user holds (or has been offered) a role
//! within an event, optionally scoped to a single track of that event. The
//! record is addressed by an [`AttendanceKey`]; at most one record exists per
//! key. Which operations one user may perform on another's record is decided
//! by the precedence numbers in the [`role`] catalog.

mod attendee;
mod identifiers;
pub mod role;

pub use attendee::{AttendanceKey, Attendee};
pub use identifiers::{EventId, TrackId, UserId};
pub use role::RoleTitle;
