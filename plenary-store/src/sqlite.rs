// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistent storage for attendance records.

use anyhow::Result;
use sqlx::migrate;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, query};

use plenary_core::{AttendanceKey, Attendee, EventId, RoleTitle, TrackId, UserId};

use crate::traits::{AttendanceStore, ConfirmedFilter, StoreError};

/// Re-export of SQLite connection pool type.
pub type Pool = SqlitePool;

/// SQLite-based persistent store.
///
/// Identity uniqueness is enforced by a unique index over the key columns, so
/// check-then-insert is atomic at the database and concurrent inserts for the
/// same key cannot both succeed.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) pool: Pool,
}

impl SqliteStore {
    /// Create a new `SqliteStore` using the provided db `Pool`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// Create the database if it doesn't already exist.
pub async fn create_database(url: &str) -> Result<()> {
    if !Sqlite::database_exists(url).await? {
        Sqlite::create_database(url).await?;
    }

    Ok(())
}

/// Create a connection pool.
pub async fn connection_pool(url: &str, max_connections: u32) -> Result<Pool> {
    let pool: Pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    Ok(pool)
}

/// Run any pending database migrations from inside the application.
pub async fn run_pending_migrations(pool: &Pool) -> Result<()> {
    migrate!().run(pool).await?;
    Ok(())
}

fn row_to_attendee(row: &SqliteRow) -> Result<Attendee, sqlx::Error> {
    let user: i64 = row.try_get("user_id")?;
    let event: i64 = row.try_get("event_id")?;
    let track: Option<i64> = row.try_get("track_id")?;
    let role: String = row.try_get("role")?;
    let confirmed: bool = row.try_get("confirmed")?;

    let role: RoleTitle = role
        .parse()
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
    let key = AttendanceKey::new(
        UserId::new(user),
        EventId::new(event),
        track.map(TrackId::new),
    );

    Ok(Attendee::new(key, role, confirmed))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn confirmed_clause(filter: ConfirmedFilter) -> &'static str {
    match filter {
        ConfirmedFilter::ConfirmedOnly => " AND confirmed = 1",
        ConfirmedFilter::UnconfirmedOnly => " AND confirmed = 0",
        ConfirmedFilter::Any => "",
    }
}

impl SqliteStore {
    async fn listing(
        &self,
        scope_clause: &str,
        scope_id: i64,
        filter: ConfirmedFilter,
    ) -> Result<Vec<Attendee>, sqlx::Error> {
        let sql = format!(
            "
            SELECT
                user_id, event_id, track_id, role, confirmed
            FROM
                attendances_v1
            WHERE
                {}{}
            ORDER BY
                user_id, event_id, track_id
            ",
            scope_clause,
            confirmed_clause(filter),
        );

        let rows = query(&sql).bind(scope_id).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_attendee).collect()
    }
}

impl AttendanceStore for SqliteStore {
    type Error = sqlx::Error;

    async fn exists(&self, key: &AttendanceKey) -> Result<bool, Self::Error> {
        let row = query(
            "
            SELECT
                1
            FROM
                attendances_v1
            WHERE
                user_id = $1 AND event_id = $2 AND track_id IS $3
            LIMIT 1
            ",
        )
        .bind(key.user().as_i64())
        .bind(key.event().as_i64())
        .bind(key.track().map(TrackId::as_i64))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn exists_confirmed(&self, key: &AttendanceKey) -> Result<bool, Self::Error> {
        let row = query(
            "
            SELECT
                1
            FROM
                attendances_v1
            WHERE
                user_id = $1 AND event_id = $2 AND track_id IS $3 AND confirmed = 1
            LIMIT 1
            ",
        )
        .bind(key.user().as_i64())
        .bind(key.event().as_i64())
        .bind(key.track().map(TrackId::as_i64))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn find(&self, key: &AttendanceKey) -> Result<Option<Attendee>, Self::Error> {
        let row = query(
            "
            SELECT
                user_id, event_id, track_id, role, confirmed
            FROM
                attendances_v1
            WHERE
                user_id = $1 AND event_id = $2 AND track_id IS $3
            ",
        )
        .bind(key.user().as_i64())
        .bind(key.event().as_i64())
        .bind(key.track().map(TrackId::as_i64))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_attendee).transpose()
    }

    async fn by_user(
        &self,
        user: UserId,
        filter: ConfirmedFilter,
    ) -> Result<Vec<Attendee>, Self::Error> {
        self.listing("user_id = $1", user.as_i64(), filter).await
    }

    async fn by_event(
        &self,
        event: EventId,
        filter: ConfirmedFilter,
    ) -> Result<Vec<Attendee>, Self::Error> {
        self.listing("event_id = $1", event.as_i64(), filter).await
    }

    async fn by_track(
        &self,
        track: TrackId,
        filter: ConfirmedFilter,
    ) -> Result<Vec<Attendee>, Self::Error> {
        self.listing("track_id = $1", track.as_i64(), filter).await
    }

    async fn insert(&mut self, attendee: Attendee) -> Result<Attendee, StoreError<Self::Error>> {
        let result = query(
            "
            INSERT INTO
                attendances_v1 (user_id, event_id, track_id, role, confirmed)
            VALUES
                ($1, $2, $3, $4, $5)
            ",
        )
        .bind(attendee.key().user().as_i64())
        .bind(attendee.key().event().as_i64())
        .bind(attendee.key().track().map(TrackId::as_i64))
        .bind(attendee.role().as_str())
        .bind(attendee.confirmed())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(attendee),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::DuplicateIdentity(*attendee.key()))
            }
            Err(err) => Err(StoreError::Backend(err)),
        }
    }

    async fn update(&mut self, attendee: Attendee) -> Result<Attendee, StoreError<Self::Error>> {
        let result = query(
            "
            UPDATE
                attendances_v1
            SET
                role = $1, confirmed = $2
            WHERE
                user_id = $3 AND event_id = $4 AND track_id IS $5
            ",
        )
        .bind(attendee.role().as_str())
        .bind(attendee.confirmed())
        .bind(attendee.key().user().as_i64())
        .bind(attendee.key().event().as_i64())
        .bind(attendee.key().track().map(TrackId::as_i64))
        .execute(&self.pool)
        .await
        .map_err(StoreError::Backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(*attendee.key()));
        }

        Ok(attendee)
    }

    async fn delete(&mut self, key: &AttendanceKey) -> Result<Attendee, StoreError<Self::Error>> {
        // Read and delete under one transaction so the returned record is the
        // one that was actually removed.
        let mut tx = self.pool.begin().await.map_err(StoreError::Backend)?;

        let row = query(
            "
            SELECT
                user_id, event_id, track_id, role, confirmed
            FROM
                attendances_v1
            WHERE
                user_id = $1 AND event_id = $2 AND track_id IS $3
            ",
        )
        .bind(key.user().as_i64())
        .bind(key.event().as_i64())
        .bind(key.track().map(TrackId::as_i64))
        .fetch_optional(&mut *tx)
        .await
        .map_err(StoreError::Backend)?;

        let Some(row) = row else {
            return Err(StoreError::NotFound(*key));
        };
        let attendee = row_to_attendee(&row).map_err(StoreError::Backend)?;

        query(
            "
            DELETE FROM
                attendances_v1
            WHERE
                user_id = $1 AND event_id = $2 AND track_id IS $3
            ",
        )
        .bind(key.user().as_i64())
        .bind(key.event().as_i64())
        .bind(key.track().map(TrackId::as_i64))
        .execute(&mut *tx)
        .await
        .map_err(StoreError::Backend)?;

        tx.commit().await.map_err(StoreError::Backend)?;

        Ok(attendee)
    }
}
