//! Event storage capability and its PostgreSQL provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, error, instrument};

use liceum_core::StorageError;
use liceum_models::{Event, EventBlock, JoinedEventRow, NewBlockDto, UpdateBlockDto, UpdateEventDto};

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Creates the event and its initial blocks, returning the new event id.
    async fn create_event(
        &self,
        name: &str,
        description: &str,
        blocks: &[NewBlockDto],
    ) -> Result<i32, StorageError>;

    async fn create_blocks(&self, event_id: i32, blocks: &[NewBlockDto]) -> Result<(), StorageError>;

    /// Deletes the event together with its blocks.
    async fn delete_event(&self, event_id: i32) -> Result<(), StorageError>;

    async fn delete_block(&self, block_id: i32) -> Result<(), StorageError>;

    async fn edit_event(&self, event_id: i32, dto: &UpdateEventDto) -> Result<(), StorageError>;

    async fn edit_block(&self, block_id: i32, dto: &UpdateBlockDto) -> Result<(), StorageError>;

    /// Events with at least one block whose window contains `now`. Blocks are not loaded.
    async fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StorageError>;

    /// One row per event × block, ordered by event id then block id.
    async fn list_all_joined(&self) -> Result<Vec<JoinedEventRow>, StorageError>;

    async fn get_event(&self, event_id: i32) -> Result<Event, StorageError>;

    async fn get_block(&self, block_id: i32) -> Result<EventBlock, StorageError>;

    /// Deletes events whose every block ended before `now`; returns how many.
    async fn clean_events(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;
}

/// Rejection for an edit whose merged dates end before they start.
pub const BLOCK_WINDOW_MESSAGE: &str = "end_date must not be before start_date";

fn backend(e: sqlx::Error) -> StorageError {
    StorageError::Backend(e.into())
}

fn missing_event(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return StorageError::NotFound("event");
        }
    }
    backend(e)
}

#[derive(Debug, Clone)]
pub struct PgEventRepository {
    db: PgPool,
}

impl PgEventRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn insert_blocks(
        tx: &mut Transaction<'_, Postgres>,
        event_id: i32,
        blocks: &[NewBlockDto],
    ) -> Result<(), sqlx::Error> {
        if blocks.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO event_blocks (event_id, name, description, link, start_date, end_date) ",
        );
        builder.push_values(blocks, |mut row, block| {
            row.push_bind(event_id)
                .push_bind(block.name.clone())
                .push_bind(block.description.clone())
                .push_bind(block.link.clone())
                .push_bind(block.start_date)
                .push_bind(block.end_date);
        });
        builder.build().execute(&mut **tx).await?;
        Ok(())
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self, description, blocks), fields(db.operation = "INSERT", db.table = "events"))]
    async fn create_event(
        &self,
        name: &str,
        description: &str,
        blocks: &[NewBlockDto],
    ) -> Result<i32, StorageError> {
        let mut tx = self.db.begin().await.map_err(backend)?;

        let id: i32 =
            sqlx::query_scalar("INSERT INTO events (name, description) VALUES ($1, $2) RETURNING id")
                .bind(name)
                .bind(description)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    error!(error = %e, "Database error creating event");
                    backend(e)
                })?;

        Self::insert_blocks(&mut tx, id, blocks)
            .await
            .map_err(backend)?;
        tx.commit().await.map_err(backend)?;

        debug!(event.id = %id, blocks = %blocks.len(), "Event created");
        Ok(id)
    }

    #[instrument(skip(self, blocks), fields(db.operation = "INSERT", db.table = "event_blocks"))]
    async fn create_blocks(&self, event_id: i32, blocks: &[NewBlockDto]) -> Result<(), StorageError> {
        let mut tx = self.db.begin().await.map_err(backend)?;
        Self::insert_blocks(&mut tx, event_id, blocks)
            .await
            .map_err(missing_event)?;
        tx.commit().await.map_err(backend)
    }

    #[instrument(skip(self), fields(db.operation = "DELETE", db.table = "events"))]
    async fn delete_event(&self, event_id: i32) -> Result<(), StorageError> {
        let mut tx = self.db.begin().await.map_err(backend)?;

        sqlx::query("DELETE FROM event_blocks WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("event"));
        }

        tx.commit().await.map_err(backend)
    }

    #[instrument(skip(self), fields(db.operation = "DELETE", db.table = "event_blocks"))]
    async fn delete_block(&self, block_id: i32) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM event_blocks WHERE id = $1")
            .bind(block_id)
            .execute(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("block"));
        }
        Ok(())
    }

    #[instrument(skip(self, dto), fields(db.operation = "UPDATE", db.table = "events"))]
    async fn edit_event(&self, event_id: i32, dto: &UpdateEventDto) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE events SET name = $1, description = $2 WHERE id = $3")
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(event_id)
            .execute(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound("event"));
        }
        Ok(())
    }

    #[instrument(skip(self, dto), fields(db.operation = "UPDATE", db.table = "event_blocks"))]
    async fn edit_block(&self, block_id: i32, dto: &UpdateBlockDto) -> Result<(), StorageError> {
        let mut tx = self.db.begin().await.map_err(backend)?;

        let (start_date, end_date): (DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
            "SELECT start_date, end_date FROM event_blocks WHERE id = $1 FOR UPDATE",
        )
        .bind(block_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?
        .ok_or(StorageError::NotFound("block"))?;

        let start_date = dto.start_date.unwrap_or(start_date);
        let end_date = dto.end_date.unwrap_or(end_date);
        if end_date < start_date {
            return Err(StorageError::Invalid(BLOCK_WINDOW_MESSAGE));
        }

        sqlx::query(
            "UPDATE event_blocks
             SET name = $1, description = $2, link = $3, start_date = $4, end_date = $5
             WHERE id = $6",
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(&dto.link)
        .bind(start_date)
        .bind(end_date)
        .bind(block_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "events"))]
    async fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StorageError> {
        sqlx::query_as::<_, Event>(
            "SELECT DISTINCT e.id, e.name, e.description
             FROM events e
             JOIN event_blocks b ON e.id = b.event_id
             WHERE b.start_date <= $1 AND b.end_date >= $1
             ORDER BY e.id",
        )
        .bind(now)
        .fetch_all(&self.db)
        .await
        .map_err(backend)
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "events"))]
    async fn list_all_joined(&self) -> Result<Vec<JoinedEventRow>, StorageError> {
        sqlx::query_as::<_, JoinedEventRow>(
            "SELECT
                 e.id AS event_id,
                 e.name AS event_name,
                 e.description AS event_description,
                 b.id AS block_id,
                 b.name AS block_name,
                 b.description AS block_description,
                 b.start_date AS block_start_date,
                 b.end_date AS block_end_date,
                 b.link AS block_link
             FROM events e
             LEFT JOIN event_blocks b ON e.id = b.event_id
             ORDER BY e.id, b.id",
        )
        .fetch_all(&self.db)
        .await
        .map_err(backend)
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "events"))]
    async fn get_event(&self, event_id: i32) -> Result<Event, StorageError> {
        let mut event = sqlx::query_as::<_, Event>(
            "SELECT id, name, description FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.db)
        .await
        .map_err(backend)?
        .ok_or(StorageError::NotFound("event"))?;

        event.blocks = sqlx::query_as::<_, EventBlock>(
            "SELECT id, event_id, name, description, start_date, end_date, link
             FROM event_blocks WHERE event_id = $1 ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(&self.db)
        .await
        .map_err(backend)?;

        Ok(event)
    }

    #[instrument(skip(self), fields(db.operation = "SELECT", db.table = "event_blocks"))]
    async fn get_block(&self, block_id: i32) -> Result<EventBlock, StorageError> {
        sqlx::query_as::<_, EventBlock>(
            "SELECT id, event_id, name, description, start_date, end_date, link
             FROM event_blocks WHERE id = $1",
        )
        .bind(block_id)
        .fetch_optional(&self.db)
        .await
        .map_err(backend)?
        .ok_or(StorageError::NotFound("block"))
    }

    #[instrument(skip(self), fields(db.operation = "DELETE", db.table = "events"))]
    async fn clean_events(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        // Blocks go with their event through ON DELETE CASCADE.
        let result = sqlx::query(
            "DELETE FROM events e
             WHERE EXISTS (SELECT 1 FROM event_blocks b WHERE b.event_id = e.id)
               AND NOT EXISTS (
                   SELECT 1 FROM event_blocks b WHERE b.event_id = e.id AND b.end_date >= $1
               )",
        )
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected())
    }
}
