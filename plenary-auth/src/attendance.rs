// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Display, Formatter};

use plenary_core::{AttendanceKey, Attendee, EventId, RoleTitle, TrackId, UserId};
use plenary_store::{AttendanceStore, ConfirmedFilter, StoreError};
use thiserror::Error;
use tracing::debug;

use crate::change::AttendanceChange;

/// The scope an attendance operation failed to match: a full identity tuple
/// or one axis of a listing query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttendanceQuery {
    Key(AttendanceKey),
    User(UserId),
    Event(EventId),
    Track(TrackId),
}

impl Display for AttendanceQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceQuery::Key(key) => write!(f, "{key}"),
            AttendanceQuery::User(user) => write!(f, "user {user}"),
            AttendanceQuery::Event(event) => write!(f, "event {event}"),
            AttendanceQuery::Track(track) => write!(f, "track {track}"),
        }
    }
}

/// Failures of attendance operations, generic over the store backend error.
#[derive(Debug, Error)]
pub enum AttendanceError<E> {
    /// A record already occupies the identity tuple; never an overwrite.
    #[error("attendance record already exists for {0}")]
    AlreadyExists(AttendanceKey),

    /// Nothing matches the key or query scope.
    #[error("no attendance record for {0}")]
    NotFound(AttendanceQuery),

    /// A record exists but has not been confirmed yet. Distinguished from
    /// [`AttendanceError::NotFound`] so callers can tell "never invited"
    /// apart from "invited but not yet accepted".
    #[error("attendance for {0} has not been confirmed")]
    Unconfirmed(AttendanceKey),

    /// The backing store failed.
    #[error("storage backend: {0}")]
    Store(#[source] E),
}

impl<E> From<StoreError<E>> for AttendanceError<E> {
    fn from(err: StoreError<E>) -> Self {
        match err {
            StoreError::DuplicateIdentity(key) => AttendanceError::AlreadyExists(key),
            StoreError::NotFound(key) => AttendanceError::NotFound(AttendanceQuery::Key(key)),
            StoreError::Backend(err) => AttendanceError::Store(err),
        }
    }
}

/// Enforces the per-identity uniqueness invariant and the confirmation state
/// machine over any [`AttendanceStore`].
///
/// ```text
/// (absent) --create--> [unconfirmed] --confirm--> [confirmed]
/// [unconfirmed] --remove--> (absent)
/// [confirmed]   --remove--> (absent)
/// ```
///
/// There is no transition from confirmed back to unconfirmed, and deletion is
/// terminal for an identity until a fresh record is created.
#[derive(Clone, Debug)]
pub struct AttendanceService<S> {
    store: S,
}

impl<S> AttendanceService<S>
where
    S: AttendanceStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a new unconfirmed attendance. The sole constructor of identity
    /// tuples; fails with [`AttendanceError::AlreadyExists`] when the tuple
    /// is occupied, confirmed or not.
    pub async fn create(
        &mut self,
        user: UserId,
        event: EventId,
        track: Option<TrackId>,
        role: RoleTitle,
    ) -> Result<AttendanceChange, AttendanceError<S::Error>> {
        let key = AttendanceKey::new(user, event, track);
        let attendee = self.store.insert(Attendee::invited(key, role)).await?;
        debug!(%key, %role, "created unconfirmed attendance");
        Ok(AttendanceChange::Created(attendee))
    }

    /// Look up a record in any confirmation state.
    pub async fn get(
        &self,
        key: &AttendanceKey,
    ) -> Result<Attendee, AttendanceError<S::Error>> {
        self.store
            .find(key)
            .await
            .map_err(AttendanceError::Store)?
            .ok_or(AttendanceError::NotFound(AttendanceQuery::Key(*key)))
    }

    /// Look up a record that must be confirmed. Fails with
    /// [`AttendanceError::NotFound`] when no record matches and with
    /// [`AttendanceError::Unconfirmed`] when one matches but is pending.
    pub async fn get_confirmed(
        &self,
        key: &AttendanceKey,
    ) -> Result<Attendee, AttendanceError<S::Error>> {
        let attendee = self.get(key).await?;
        if !attendee.confirmed() {
            return Err(AttendanceError::Unconfirmed(*key));
        }
        Ok(attendee)
    }

    /// Confirmed attendances of one user.
    pub async fn list_by_user(
        &self,
        user: UserId,
    ) -> Result<Vec<Attendee>, AttendanceError<S::Error>> {
        let records = self
            .store
            .by_user(user, ConfirmedFilter::ConfirmedOnly)
            .await
            .map_err(AttendanceError::Store)?;
        Self::non_empty(records, AttendanceQuery::User(user))
    }

    /// Confirmed attendances within one event.
    pub async fn list_by_event(
        &self,
        event: EventId,
    ) -> Result<Vec<Attendee>, AttendanceError<S::Error>> {
        let records = self
            .store
            .by_event(event, ConfirmedFilter::ConfirmedOnly)
            .await
            .map_err(AttendanceError::Store)?;
        Self::non_empty(records, AttendanceQuery::Event(event))
    }

    /// Confirmed attendances within one track.
    pub async fn list_by_track(
        &self,
        track: TrackId,
    ) -> Result<Vec<Attendee>, AttendanceError<S::Error>> {
        let records = self
            .store
            .by_track(track, ConfirmedFilter::ConfirmedOnly)
            .await
            .map_err(AttendanceError::Store)?;
        Self::non_empty(records, AttendanceQuery::Track(track))
    }

    /// Open invitations of one user: records offered but not yet accepted.
    pub async fn pending_by_user(
        &self,
        user: UserId,
    ) -> Result<Vec<Attendee>, AttendanceError<S::Error>> {
        let records = self
            .store
            .by_user(user, ConfirmedFilter::UnconfirmedOnly)
            .await
            .map_err(AttendanceError::Store)?;
        Self::non_empty(records, AttendanceQuery::User(user))
    }

    // An empty listing surfaces as NotFound. This conflates "no data" with
    // "error" but is the behavior callers rely on; see DESIGN.md.
    fn non_empty(
        records: Vec<Attendee>,
        query: AttendanceQuery,
    ) -> Result<Vec<Attendee>, AttendanceError<S::Error>> {
        if records.is_empty() {
            return Err(AttendanceError::NotFound(query));
        }
        Ok(records)
    }

    /// Mark a record as confirmed. Idempotent: confirming a confirmed record
    /// reports the outcome again without touching the store.
    pub async fn confirm(
        &mut self,
        key: &AttendanceKey,
    ) -> Result<AttendanceChange, AttendanceError<S::Error>> {
        let mut attendee = self.get(key).await?;
        if !attendee.confirmed() {
            attendee.confirm();
            attendee = self.store.update(attendee).await?;
            debug!(%key, "attendance confirmed");
        }
        Ok(AttendanceChange::Confirmed(attendee))
    }

    /// Overwrite the stored role in place. No separate approval step: the
    /// record keeps its confirmation state.
    pub async fn change_role(
        &mut self,
        key: &AttendanceKey,
        role: RoleTitle,
    ) -> Result<AttendanceChange, AttendanceError<S::Error>> {
        let mut attendee = self.get(key).await?;
        let previous = attendee.change_role(role);
        let current = self.store.update(attendee).await?;
        debug!(%key, %previous, %role, "attendance role changed");
        Ok(AttendanceChange::RoleChanged { previous, current })
    }

    /// Delete a record regardless of its confirmation state.
    pub async fn remove(
        &mut self,
        key: &AttendanceKey,
    ) -> Result<AttendanceChange, AttendanceError<S::Error>> {
        let removed = self.store.delete(key).await?;
        debug!(%key, "attendance removed");
        Ok(AttendanceChange::Removed(removed))
    }
}
