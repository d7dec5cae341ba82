// SPDX-License-Identifier: MIT OR Apache-2.0

use plenary_core::role;
use plenary_core::{AttendanceKey, EventId, RoleTitle, TrackId, UserId};
use plenary_store::AttendanceStore;
use thiserror::Error;
use tracing::debug;

use crate::attendance::{AttendanceError, AttendanceService};
use crate::change::AttendanceChange;

/// Failures of permissioned invitation operations.
#[derive(Debug, Error)]
pub enum InvitationError<E> {
    /// The acting user holds no confirmed role in the targeted event/track
    /// scope at all.
    #[error("user {0} holds no confirmed attendance in the targeted scope")]
    ExecutorNotAttending(UserId),

    /// The acting user's permission rank does not reach the targeted role.
    #[error("user {executor} may not affect the {target} role")]
    InsufficientPermission { executor: UserId, target: RoleTitle },

    /// Reject aimed at a record that is no longer pending.
    #[error("attendance for {0} is already confirmed")]
    NotPending(AttendanceKey),

    #[error(transparent)]
    Attendance(#[from] AttendanceError<E>),
}

/// Permissioned wrapper around [`AttendanceService`].
///
/// Every operation except [`enroll`](InvitationService::enroll) and
/// [`resign`](InvitationService::resign) names an executor. The executor must
/// hold a confirmed attendance in the same event/track scope as the target,
/// and their role's permission number must not exceed the precedence number
/// of the role being granted, confirmed or revoked. The comparison is purely
/// numeric; role names never enter into it.
#[derive(Clone, Debug)]
pub struct InvitationService<S> {
    attendances: AttendanceService<S>,
}

impl<S> InvitationService<S>
where
    S: AttendanceStore,
{
    pub fn new(attendances: AttendanceService<S>) -> Self {
        Self { attendances }
    }

    /// Access the wrapped attendance service.
    pub fn attendances(&self) -> &AttendanceService<S> {
        &self.attendances
    }

    /// Offer `target` the given role within an event or track. The record is
    /// created unconfirmed; an occupied identity propagates as
    /// [`AttendanceError::AlreadyExists`] unchanged.
    pub async fn invite(
        &mut self,
        executor: UserId,
        target: UserId,
        event: EventId,
        track: Option<TrackId>,
        role: RoleTitle,
    ) -> Result<AttendanceChange, InvitationError<S::Error>> {
        self.authorize(executor, event, track, role).await?;
        Ok(self.attendances.create(target, event, track, role).await?)
    }

    /// Confirm a pending attendance. The executor is either the invited user
    /// themselves, or someone senior enough to have issued the invitation in
    /// the first place (a chair pre-confirming a delegate).
    pub async fn accept(
        &mut self,
        executor: UserId,
        key: &AttendanceKey,
    ) -> Result<AttendanceChange, InvitationError<S::Error>> {
        if executor != key.user() {
            let attendee = self.attendances.get(key).await?;
            self.authorize(executor, key.event(), key.track(), attendee.role())
                .await?;
        }
        Ok(self.attendances.confirm(key).await?)
    }

    /// Decline a pending invitation, deleting its record. Permitted to the
    /// invited user and to sufficiently senior executors; a record that is
    /// already confirmed cannot be rejected, only removed.
    pub async fn reject(
        &mut self,
        executor: UserId,
        key: &AttendanceKey,
    ) -> Result<AttendanceChange, InvitationError<S::Error>> {
        let attendee = self.attendances.get(key).await?;
        if attendee.confirmed() {
            return Err(InvitationError::NotPending(*key));
        }
        if executor != key.user() {
            self.authorize(executor, key.event(), key.track(), attendee.role())
                .await?;
        }
        Ok(self.attendances.remove(key).await?)
    }

    /// Revoke an attendance in any confirmation state. The permission
    /// comparison runs against the target's current role, not a role being
    /// granted; the named user may always remove themselves.
    pub async fn remove(
        &mut self,
        executor: UserId,
        key: &AttendanceKey,
    ) -> Result<AttendanceChange, InvitationError<S::Error>> {
        if executor != key.user() {
            let attendee = self.attendances.get(key).await?;
            self.authorize(executor, key.event(), key.track(), attendee.role())
                .await?;
        }
        Ok(self.attendances.remove(key).await?)
    }

    /// Self-initiated withdrawal from an event or track, in any confirmation
    /// state. No permission comparison: even the lowest role can leave.
    pub async fn resign(
        &mut self,
        user: UserId,
        event: EventId,
        track: Option<TrackId>,
    ) -> Result<AttendanceChange, InvitationError<S::Error>> {
        let key = AttendanceKey::new(user, event, track);
        Ok(self.attendances.remove(&key).await?)
    }

    /// Self-service registration for the lowest-privilege flows, e.g. a plain
    /// attendee signing up for an event. Bypasses the permission comparison
    /// entirely; restricting which roles may be enrolled is the caller's
    /// concern.
    pub async fn enroll(
        &mut self,
        user: UserId,
        event: EventId,
        track: Option<TrackId>,
        role: RoleTitle,
    ) -> Result<AttendanceChange, InvitationError<S::Error>> {
        Ok(self.attendances.create(user, event, track, role).await?)
    }

    /// Resolve the executor's own confirmed attendance in the scope and apply
    /// the precedence comparison against `target_role`.
    async fn authorize(
        &self,
        executor: UserId,
        event: EventId,
        track: Option<TrackId>,
        target_role: RoleTitle,
    ) -> Result<(), InvitationError<S::Error>> {
        let key = AttendanceKey::new(executor, event, track);
        let attendance = match self.attendances.get_confirmed(&key).await {
            Ok(attendee) => attendee,
            Err(AttendanceError::NotFound(_) | AttendanceError::Unconfirmed(_)) => {
                return Err(InvitationError::ExecutorNotAttending(executor));
            }
            Err(err) => return Err(err.into()),
        };

        if !role::permits(attendance.role(), target_role) {
            debug!(%executor, role = %attendance.role(), target = %target_role, "permission denied");
            return Err(InvitationError::InsufficientPermission {
                executor,
                target: target_role,
            });
        }

        Ok(())
    }
}
