// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::identifiers::{EventId, TrackId, UserId};
use crate::role::RoleTitle;

/// Composite identity of an attendance record.
///
/// The track slot is optional and the absent branch is a distinct identity:
/// an event-level attendance for a user never collides with any track-level
/// attendance of the same user in the same event.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttendanceKey {
    user: UserId,
    event: EventId,
    track: Option<TrackId>,
}

impl AttendanceKey {
    pub fn new(user: UserId, event: EventId, track: Option<TrackId>) -> Self {
        Self { user, event, track }
    }

    /// Key of an attendance scoped to a whole event.
    pub fn event_level(user: UserId, event: EventId) -> Self {
        Self::new(user, event, None)
    }

    /// Key of an attendance scoped to a single track.
    pub fn track_level(user: UserId, event: EventId, track: TrackId) -> Self {
        Self::new(user, event, Some(track))
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn event(&self) -> EventId {
        self.event
    }

    pub fn track(&self) -> Option<TrackId> {
        self.track
    }
}

impl Display for AttendanceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.track {
            Some(track) => write!(
                f,
                "(user {}, event {}, track {})",
                self.user, self.event, track
            ),
            None => write!(f, "(user {}, event {})", self.user, self.event),
        }
    }
}

/// An attendance record: user `key.user` holds, or has been offered, role
/// `role` within the scope named by `key`.
///
/// Records start out unconfirmed ("invitations") and flip to confirmed exactly
/// once; there is no way back. The attendance service owns these transitions,
/// stores only persist them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attendee {
    key: AttendanceKey,
    role: RoleTitle,
    confirmed: bool,
}

impl Attendee {
    pub fn new(key: AttendanceKey, role: RoleTitle, confirmed: bool) -> Self {
        Self {
            key,
            role,
            confirmed,
        }
    }

    /// A freshly offered, not yet accepted attendance.
    pub fn invited(key: AttendanceKey, role: RoleTitle) -> Self {
        Self::new(key, role, false)
    }

    pub fn key(&self) -> &AttendanceKey {
        &self.key
    }

    pub fn role(&self) -> RoleTitle {
        self.role
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    /// Mark the attendance as accepted. Idempotent.
    pub fn confirm(&mut self) {
        self.confirmed = true;
    }

    /// Overwrite the stored role, returning the previous one.
    pub fn change_role(&mut self, role: RoleTitle) -> RoleTitle {
        std::mem::replace(&mut self.role, role)
    }
}
