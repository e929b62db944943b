use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{refresh_token, send_auth_code, verify_code};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/send-code", post(send_auth_code))
        .route("/verify-code", post(verify_code))
        .route("/refresh", post(refresh_token))
}
