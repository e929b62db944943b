use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use tracing::instrument;

use liceum_core::AppError;
use liceum_models::{
    BlockResponse, CreateBlocksDto, CreateEventDto, CreatedResponse, EventResponse,
    EventsResponse, StatusResponse, UpdateBlockDto, UpdateEventDto,
};

use crate::middleware::auth::AdminUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn path_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("invalid id: {}", e)))
}

/// List all events with their blocks
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "All events", body = EventsResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Events"
)]
#[instrument(skip(state))]
pub async fn list_events(State(state): State<AppState>) -> Result<Json<EventsResponse>, AppError> {
    let events = state.events.list_all().await?;
    Ok(Json(EventsResponse { events }))
}

/// List events with a block running right now
#[utoipa::path(
    get,
    path = "/api/events/current",
    responses(
        (status = 200, description = "Events in progress", body = EventsResponse)
    ),
    tag = "Events"
)]
#[instrument(skip(state))]
pub async fn list_current_events(
    State(state): State<AppState>,
) -> Result<Json<EventsResponse>, AppError> {
    let events = state.events.list_current().await?;
    Ok(Json(EventsResponse { events }))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event with its blocks", body = EventResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events"
)]
#[instrument(skip(state, id))]
pub async fn get_event(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.events.get_event(path_id(id)?).await?;
    Ok(Json(EventResponse { event }))
}

#[utoipa::path(
    get,
    path = "/api/blocks/{id}",
    params(("id" = i32, Path, description = "Block ID")),
    responses(
        (status = 200, description = "Event block", body = BlockResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Block not found", body = ErrorResponse)
    ),
    tag = "Events"
)]
#[instrument(skip(state, id))]
pub async fn get_block(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<BlockResponse>, AppError> {
    let block = state.events.get_block(path_id(id)?).await?;
    Ok(Json(BlockResponse { block }))
}

/// Create an event, optionally with its first blocks
#[utoipa::path(
    post,
    path = "/api/admin/events",
    request_body = CreateEventDto,
    responses(
        (status = 200, description = "Event created", body = CreatedResponse),
        (status = 401, description = "Not an administrator", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, dto), fields(auth.email = %admin.email))]
pub async fn create_event(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<Json<CreatedResponse>, AppError> {
    let id = state.events.create_event(dto).await?;
    Ok(Json(CreatedResponse { id }))
}

#[utoipa::path(
    put,
    path = "/api/admin/events/{id}",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = StatusResponse),
        (status = 401, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, id, dto), fields(auth.email = %admin.email))]
pub async fn edit_event(
    State(state): State<AppState>,
    admin: AdminUser,
    id: Result<Path<i32>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<StatusResponse>, AppError> {
    state.events.edit_event(path_id(id)?, dto).await?;
    Ok(Json(StatusResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/events/{id}",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event and its blocks deleted", body = StatusResponse),
        (status = 401, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, id), fields(auth.email = %admin.email))]
pub async fn delete_event(
    State(state): State<AppState>,
    admin: AdminUser,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    state.events.delete_event(path_id(id)?).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Add blocks to an existing event
#[utoipa::path(
    post,
    path = "/api/admin/blocks",
    request_body = CreateBlocksDto,
    responses(
        (status = 200, description = "Blocks created", body = StatusResponse),
        (status = 401, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, dto), fields(auth.email = %admin.email))]
pub async fn create_blocks(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateBlocksDto>,
) -> Result<Json<StatusResponse>, AppError> {
    state.events.create_blocks(dto).await?;
    Ok(Json(StatusResponse::ok()))
}

#[utoipa::path(
    put,
    path = "/api/admin/blocks/{id}",
    params(("id" = i32, Path, description = "Block ID")),
    request_body = UpdateBlockDto,
    responses(
        (status = 200, description = "Block updated", body = StatusResponse),
        (status = 401, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Block not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, id, dto), fields(auth.email = %admin.email))]
pub async fn edit_block(
    State(state): State<AppState>,
    admin: AdminUser,
    id: Result<Path<i32>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateBlockDto>,
) -> Result<Json<StatusResponse>, AppError> {
    state.events.edit_block(path_id(id)?, dto).await?;
    Ok(Json(StatusResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/blocks/{id}",
    params(("id" = i32, Path, description = "Block ID")),
    responses(
        (status = 200, description = "Block deleted", body = StatusResponse),
        (status = 401, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Block not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, id), fields(auth.email = %admin.email))]
pub async fn delete_block(
    State(state): State<AppState>,
    admin: AdminUser,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    state.events.delete_block(path_id(id)?).await?;
    Ok(Json(StatusResponse::ok()))
}
