use axum::Json;
use axum::extract::State;
use tracing::instrument;
use utoipa::ToSchema;

use liceum_auth::TokenPair;
use liceum_core::AppError;
use liceum_models::{RefreshTokenRequest, SendCodeRequest, StatusResponse, VerifyCodeRequest};

use crate::state::AppState;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Email a one-time sign-in code to an administrator
#[utoipa::path(
    post,
    path = "/api/auth/send-code",
    request_body = SendCodeRequest,
    responses(
        (status = 200, description = "Code sent", body = StatusResponse),
        (status = 403, description = "Email is not on the administrator allow-list", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 502, description = "Email delivery failed", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn send_auth_code(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SendCodeRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    state.auth.send_auth_code(&dto.email).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Exchange an emailed code for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/auth/verify-code",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code accepted", body = TokenPair),
        (status = 401, description = "Wrong, absent or expired code", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto), fields(auth.email = %dto.email))]
pub async fn verify_code(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerifyCodeRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth.verify_code(&dto.email, &dto.code).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth.refresh_token(&dto.refresh_token).await?;
    Ok(Json(pair))
}
