//! # Liceum Models
//!
//! Domain models and request/response DTOs.
//!
//! - [`events`]: events, their time-windowed blocks, and the flat join row
//!   the aggregated listing is built from
//! - [`auth`]: login and token refresh payloads

pub mod auth;
pub mod events;

pub use auth::{RefreshTokenRequest, SendCodeRequest, StatusResponse, VerifyCodeRequest};
pub use events::{
    BlockResponse, CreateBlocksDto, CreateEventDto, CreatedResponse, Event, EventBlock,
    EventResponse, EventsResponse, JoinedEventRow, NewBlockDto, UpdateBlockDto, UpdateEventDto,
};
