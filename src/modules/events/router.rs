use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_blocks, create_event, delete_block, delete_event, edit_block, edit_event, get_block,
    get_event, list_current_events, list_events,
};

pub fn init_events_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/current", get(list_current_events))
        .route("/{id}", get(get_event))
}

pub fn init_blocks_router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_block))
}

pub fn init_admin_router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/{id}", put(edit_event).delete(delete_event))
        .route("/blocks", post(create_blocks))
        .route("/blocks/{id}", put(edit_block).delete(delete_block))
}
