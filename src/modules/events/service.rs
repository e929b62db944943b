use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, info, instrument};

use liceum_auth::Clock;
use liceum_core::StorageError;
use liceum_models::{
    CreateBlocksDto, CreateEventDto, Event, EventBlock, UpdateBlockDto, UpdateEventDto,
};

use super::aggregator::aggregate_events;
use super::repository::EventRepository;
use crate::metrics;

pub struct EventService {
    repo: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
    list_calls: AtomicU64,
    cleanup_every: u64,
}

impl EventService {
    pub fn new(repo: Arc<dyn EventRepository>, clock: Arc<dyn Clock>, cleanup_every: u64) -> Self {
        Self {
            repo,
            clock,
            list_calls: AtomicU64::new(0),
            cleanup_every: cleanup_every.max(1),
        }
    }

    #[instrument(skip(self, dto), fields(event.name = %dto.name))]
    pub async fn create_event(&self, dto: CreateEventDto) -> Result<i32, StorageError> {
        let id = self
            .repo
            .create_event(&dto.name, &dto.description, &dto.blocks)
            .await?;
        info!(event.id = %id, "Event created");
        Ok(id)
    }

    #[instrument(skip(self, dto), fields(event.id = %dto.event_id))]
    pub async fn create_blocks(&self, dto: CreateBlocksDto) -> Result<(), StorageError> {
        self.repo.create_blocks(dto.event_id, &dto.blocks).await
    }

    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: i32) -> Result<(), StorageError> {
        self.repo.delete_event(event_id).await?;
        info!(event.id = %event_id, "Event deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_block(&self, block_id: i32) -> Result<(), StorageError> {
        self.repo.delete_block(block_id).await
    }

    #[instrument(skip(self, dto))]
    pub async fn edit_event(&self, event_id: i32, dto: UpdateEventDto) -> Result<(), StorageError> {
        self.repo.edit_event(event_id, &dto).await
    }

    #[instrument(skip(self, dto))]
    pub async fn edit_block(&self, block_id: i32, dto: UpdateBlockDto) -> Result<(), StorageError> {
        self.repo.edit_block(block_id, &dto).await
    }

    pub async fn get_event(&self, event_id: i32) -> Result<Event, StorageError> {
        self.repo.get_event(event_id).await
    }

    pub async fn get_block(&self, block_id: i32) -> Result<EventBlock, StorageError> {
        self.repo.get_block(block_id).await
    }

    pub async fn list_current(&self) -> Result<Vec<Event>, StorageError> {
        self.repo.list_current(self.clock.now()).await
    }

    /// Lists every event with its blocks.
    ///
    /// Every `cleanup_every`th call also starts a background cleanup. Its
    /// outcome is only logged and never reaches this caller.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Event>, StorageError> {
        let calls = self.list_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if calls % self.cleanup_every == 0 {
            self.spawn_cleanup();
        }

        let rows = self.repo.list_all_joined().await?;
        Ok(aggregate_events(rows))
    }

    /// Deletes events whose blocks have all ended.
    #[instrument(skip(self))]
    pub async fn clean_events(&self) -> Result<u64, StorageError> {
        let removed = self.repo.clean_events(self.clock.now()).await?;
        info!(events.removed = %removed, "Stale events cleaned");
        Ok(removed)
    }

    fn spawn_cleanup(&self) {
        let repo = self.repo.clone();
        let now = self.clock.now();
        tokio::spawn(async move {
            match repo.clean_events(now).await {
                Ok(removed) => {
                    metrics::track_cleanup(true);
                    info!(events.removed = %removed, "Periodic event cleanup finished");
                }
                Err(e) => {
                    metrics::track_cleanup(false);
                    error!(error = %e, "Periodic event cleanup failed");
                }
            }
        });
    }
}
