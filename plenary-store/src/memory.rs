// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence for attendance records.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use plenary_core::{AttendanceKey, Attendee, EventId, TrackId, UserId};

use crate::traits::{AttendanceStore, ConfirmedFilter, StoreError};

/// Record map shared by all clones of a [`MemoryStore`].
#[derive(Clone, Debug, Default)]
pub struct InnerMemoryStore {
    records: HashMap<AttendanceKey, Attendee>,
}

/// An in-memory store for attendance records.
///
/// `MemoryStore` supports usage in asynchronous and multi-threaded contexts
/// by wrapping an [`InnerMemoryStore`] with an `RwLock` and `Arc`.
/// Convenience methods are provided to obtain a read- or write-lock on the
/// underlying map. `insert` holds the write-lock across its existence check
/// and the write, which makes check-then-insert atomic per key.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<InnerMemoryStore>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a read-lock on the store.
    pub fn read_store(&self) -> RwLockReadGuard<'_, InnerMemoryStore> {
        self.inner
            .read()
            .expect("acquire shared read access on store")
    }

    /// Obtain a write-lock on the store.
    pub fn write_store(&self) -> RwLockWriteGuard<'_, InnerMemoryStore> {
        self.inner
            .write()
            .expect("acquire exclusive write access on store")
    }

    fn filtered<F>(&self, filter: ConfirmedFilter, scope: F) -> Vec<Attendee>
    where
        F: Fn(&AttendanceKey) -> bool,
    {
        let mut records: Vec<Attendee> = self
            .read_store()
            .records
            .values()
            .filter(|attendee| scope(attendee.key()) && filter.matches(attendee.confirmed()))
            .copied()
            .collect();
        records.sort_by_key(|attendee| *attendee.key());
        records
    }
}

impl AttendanceStore for MemoryStore {
    type Error = Infallible;

    async fn exists(&self, key: &AttendanceKey) -> Result<bool, Self::Error> {
        Ok(self.read_store().records.contains_key(key))
    }

    async fn exists_confirmed(&self, key: &AttendanceKey) -> Result<bool, Self::Error> {
        Ok(self
            .read_store()
            .records
            .get(key)
            .is_some_and(|attendee| attendee.confirmed()))
    }

    async fn find(&self, key: &AttendanceKey) -> Result<Option<Attendee>, Self::Error> {
        Ok(self.read_store().records.get(key).copied())
    }

    async fn by_user(
        &self,
        user: UserId,
        filter: ConfirmedFilter,
    ) -> Result<Vec<Attendee>, Self::Error> {
        Ok(self.filtered(filter, |key| key.user() == user))
    }

    async fn by_event(
        &self,
        event: EventId,
        filter: ConfirmedFilter,
    ) -> Result<Vec<Attendee>, Self::Error> {
        Ok(self.filtered(filter, |key| key.event() == event))
    }

    async fn by_track(
        &self,
        track: TrackId,
        filter: ConfirmedFilter,
    ) -> Result<Vec<Attendee>, Self::Error> {
        Ok(self.filtered(filter, |key| key.track() == Some(track)))
    }

    async fn insert(&mut self, attendee: Attendee) -> Result<Attendee, StoreError<Self::Error>> {
        let mut store = self.write_store();
        if store.records.contains_key(attendee.key()) {
            return Err(StoreError::DuplicateIdentity(*attendee.key()));
        }
        store.records.insert(*attendee.key(), attendee);
        Ok(attendee)
    }

    async fn update(&mut self, attendee: Attendee) -> Result<Attendee, StoreError<Self::Error>> {
        let mut store = self.write_store();
        if !store.records.contains_key(attendee.key()) {
            return Err(StoreError::NotFound(*attendee.key()));
        }
        store.records.insert(*attendee.key(), attendee);
        Ok(attendee)
    }

    async fn delete(&mut self, key: &AttendanceKey) -> Result<Attendee, StoreError<Self::Error>> {
        self.write_store()
            .records
            .remove(key)
            .ok_or(StoreError::NotFound(*key))
    }
}

#[cfg(test)]
mod tests {
    use plenary_core::RoleTitle;

    use super::*;

    fn key(user: i64, event: i64, track: Option<i64>) -> AttendanceKey {
        AttendanceKey::new(user.into(), event.into(), track.map(Into::into))
    }

    #[tokio::test]
    async fn insert_rejects_occupied_keys() {
        let mut store = MemoryStore::new();
        let attendee = Attendee::invited(key(5, 10, None), RoleTitle::Attendee);

        store.insert(attendee).await.unwrap();
        assert!(store.exists(&key(5, 10, None)).await.unwrap());

        let second = Attendee::invited(key(5, 10, None), RoleTitle::Author);
        assert!(matches!(
            store.insert(second).await,
            Err(StoreError::DuplicateIdentity(_))
        ));

        // The original record is untouched.
        let stored = store.find(&key(5, 10, None)).await.unwrap().unwrap();
        assert_eq!(stored.role(), RoleTitle::Attendee);
    }

    #[tokio::test]
    async fn absent_track_never_collides_with_concrete_tracks() {
        let mut store = MemoryStore::new();

        store
            .insert(Attendee::invited(key(5, 10, None), RoleTitle::Attendee))
            .await
            .unwrap();
        store
            .insert(Attendee::invited(key(5, 10, Some(51)), RoleTitle::Author))
            .await
            .unwrap();

        assert!(store.exists(&key(5, 10, None)).await.unwrap());
        assert!(store.exists(&key(5, 10, Some(51))).await.unwrap());
        assert!(!store.exists(&key(5, 10, Some(52))).await.unwrap());
    }

    #[tokio::test]
    async fn listings_respect_the_confirmation_filter() {
        let mut store = MemoryStore::new();

        let mut confirmed = Attendee::invited(key(1, 10, None), RoleTitle::PcChair);
        confirmed.confirm();
        store.insert(confirmed).await.unwrap();
        store
            .insert(Attendee::invited(key(2, 10, None), RoleTitle::Author))
            .await
            .unwrap();

        let all = store
            .by_event(10.into(), ConfirmedFilter::Any)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let confirmed_only = store
            .by_event(10.into(), ConfirmedFilter::ConfirmedOnly)
            .await
            .unwrap();
        assert_eq!(confirmed_only.len(), 1);
        assert_eq!(confirmed_only[0].key().user(), 1.into());

        let pending = store
            .by_user(2.into(), ConfirmedFilter::UnconfirmedOnly)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert!(!pending[0].confirmed());
    }

    #[tokio::test]
    async fn update_and_delete_require_a_present_record() {
        let mut store = MemoryStore::new();
        let attendee = Attendee::invited(key(5, 10, Some(51)), RoleTitle::Author);

        assert!(matches!(
            store.update(attendee).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&key(5, 10, Some(51))).await,
            Err(StoreError::NotFound(_))
        ));

        store.insert(attendee).await.unwrap();
        let mut updated = attendee;
        updated.confirm();
        store.update(updated).await.unwrap();
        assert!(store.exists_confirmed(&key(5, 10, Some(51))).await.unwrap());

        let removed = store.delete(&key(5, 10, Some(51))).await.unwrap();
        assert_eq!(removed.key(), &key(5, 10, Some(51)));
        assert!(store.find(&key(5, 10, Some(51))).await.unwrap().is_none());
    }
}
