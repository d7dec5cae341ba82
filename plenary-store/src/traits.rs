// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait interface for attendance record persistence.

use std::error::Error;

use plenary_core::{AttendanceKey, Attendee, EventId, TrackId, UserId};
use thiserror::Error as ThisError;

/// Which confirmation states a listing query includes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfirmedFilter {
    ConfirmedOnly,
    UnconfirmedOnly,
    Any,
}

impl ConfirmedFilter {
    pub fn matches(self, confirmed: bool) -> bool {
        match self {
            ConfirmedFilter::ConfirmedOnly => confirmed,
            ConfirmedFilter::UnconfirmedOnly => !confirmed,
            ConfirmedFilter::Any => true,
        }
    }
}

/// Failures of keyed store operations, generic over the backend error.
#[derive(Debug, ThisError)]
pub enum StoreError<E> {
    /// A record already occupies the identity tuple.
    #[error("attendance record already exists for {0}")]
    DuplicateIdentity(AttendanceKey),

    /// No record matches the identity tuple.
    #[error("no attendance record for {0}")]
    NotFound(AttendanceKey),

    /// The backing store itself failed.
    #[error("storage backend: {0}")]
    Backend(#[from] E),
}

/// Persistence interface for attendance records, keyed by identity tuple.
///
/// The absent-track branch of the key is a distinct identity, never a
/// wildcard: implementations must treat `(user, event, None)` and
/// `(user, event, Some(t))` as unrelated records.
///
/// `insert` must perform its existence check and the write as a single atomic
/// unit with respect to concurrent inserts for the same key: two concurrent
/// inserts for one tuple must not both succeed.
pub trait AttendanceStore {
    type Error: Error;

    /// Return true if any record, confirmed or not, matches the key.
    fn exists(&self, key: &AttendanceKey) -> impl Future<Output = Result<bool, Self::Error>>;

    /// Return true if a confirmed record matches the key.
    fn exists_confirmed(
        &self,
        key: &AttendanceKey,
    ) -> impl Future<Output = Result<bool, Self::Error>>;

    fn find(
        &self,
        key: &AttendanceKey,
    ) -> impl Future<Output = Result<Option<Attendee>, Self::Error>>;

    /// All records of one user across events and tracks, in key order.
    fn by_user(
        &self,
        user: UserId,
        filter: ConfirmedFilter,
    ) -> impl Future<Output = Result<Vec<Attendee>, Self::Error>>;

    /// All records within one event, including its tracks, in key order.
    fn by_event(
        &self,
        event: EventId,
        filter: ConfirmedFilter,
    ) -> impl Future<Output = Result<Vec<Attendee>, Self::Error>>;

    /// All records within one track, in key order.
    fn by_track(
        &self,
        track: TrackId,
        filter: ConfirmedFilter,
    ) -> impl Future<Output = Result<Vec<Attendee>, Self::Error>>;

    /// Insert a new record, failing with [`StoreError::DuplicateIdentity`]
    /// when its key is already occupied.
    fn insert(
        &mut self,
        attendee: Attendee,
    ) -> impl Future<Output = Result<Attendee, StoreError<Self::Error>>>;

    /// Overwrite the record stored under `attendee.key()`, failing with
    /// [`StoreError::NotFound`] when there is none.
    fn update(
        &mut self,
        attendee: Attendee,
    ) -> impl Future<Output = Result<Attendee, StoreError<Self::Error>>>;

    /// Delete and return the record under `key`, failing with
    /// [`StoreError::NotFound`] when there is none.
    fn delete(
        &mut self,
        key: &AttendanceKey,
    ) -> impl Future<Output = Result<Attendee, StoreError<Self::Error>>>;
}
