// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendance management and role-based invitation authorization.
//!
//! [`AttendanceService`] owns the lifecycle of attendance records over any
//! [`plenary_store::AttendanceStore`]: records are created unconfirmed, flip
//! to confirmed exactly once, and are deleted terminally. Every mutation
//! returns an [`AttendanceChange`] describing what happened, so callers can
//! feed an audit trail without the core doing any logging of its own.
//!
//! [`InvitationService`] wraps the attendance service with the permission
//! rule of the role catalog: an executor may grant, confirm or revoke a role
//! in others only when their own confirmed role in the same event/track scope
//! reaches far enough down the hierarchy. See [`plenary_core::role`] for the
//! numbers.

mod attendance;
mod change;
mod invitation;
#[cfg(test)]
mod tests;

pub use attendance::{AttendanceError, AttendanceQuery, AttendanceService};
pub use change::AttendanceChange;
pub use invitation::{InvitationError, InvitationService};
