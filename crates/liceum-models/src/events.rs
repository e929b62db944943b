//! Events, blocks, and their DTOs.
//!
//! An [`Event`] owns an ordered list of [`EventBlock`]s. Every block's
//! `event_id` equals the id of the event that lists it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[sqlx(skip)]
    #[serde(rename = "event_blocks", default)]
    pub blocks: Vec<EventBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventBlock {
    pub id: i32,
    pub event_id: i32,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub link: String,
}

/// One row of `events LEFT JOIN event_blocks`.
///
/// Block columns are all `None` for an event without blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct JoinedEventRow {
    pub event_id: i32,
    pub event_name: String,
    pub event_description: String,
    pub block_id: Option<i32>,
    pub block_name: Option<String>,
    pub block_description: Option<String>,
    pub block_start_date: Option<DateTime<Utc>>,
    pub block_end_date: Option<DateTime<Utc>>,
    pub block_link: Option<String>,
}

fn validate_block_window(block: &NewBlockDto) -> Result<(), ValidationError> {
    if block.end_date < block.start_date {
        return Err(ValidationError::new("block_window")
            .with_message("end_date must not be before start_date".into()));
    }
    Ok(())
}

fn validate_update_window(block: &UpdateBlockDto) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (block.start_date, block.end_date) {
        if end < start {
            return Err(ValidationError::new("block_window")
                .with_message("end_date must not be before start_date".into()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_block_window"))]
pub struct NewBlockDto {
    #[validate(length(min = 1, message = "block name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEventDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "event_blocks")]
    #[validate(nested)]
    pub blocks: Vec<NewBlockDto>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBlocksDto {
    pub event_id: i32,
    #[validate(length(min = 1, message = "at least one block is required"), nested)]
    pub blocks: Vec<NewBlockDto>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateEventDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Absent dates keep the stored values.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_window"))]
pub struct UpdateBlockDto {
    #[validate(length(min = 1, message = "block name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockResponse {
    pub block: EventBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}
