// SPDX-License-Identifier: MIT OR Apache-2.0

use plenary_core::{Attendee, RoleTitle};

/// Observable outcome of a mutating attendance operation.
///
/// State transitions are the natural audit points of this core; instead of
/// accumulating events on the record, every mutation hands its outcome back
/// to the caller, which may forward it to an audit or log collaborator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttendanceChange {
    /// A new unconfirmed record was created.
    Created(Attendee),

    /// The record is confirmed. Confirming an already confirmed record
    /// reports this outcome again rather than failing.
    Confirmed(Attendee),

    /// The stored role was overwritten in place.
    RoleChanged {
        previous: RoleTitle,
        current: Attendee,
    },

    /// The record was deleted, in whatever state it was in.
    Removed(Attendee),
}

impl AttendanceChange {
    /// The record the change applies to; for [`AttendanceChange::Removed`]
    /// the record as it was at deletion.
    pub fn attendee(&self) -> &Attendee {
        match self {
            AttendanceChange::Created(attendee) => attendee,
            AttendanceChange::Confirmed(attendee) => attendee,
            AttendanceChange::RoleChanged { current, .. } => current,
            AttendanceChange::Removed(attendee) => attendee,
        }
    }
}
