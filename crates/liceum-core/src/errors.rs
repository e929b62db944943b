//! Application error types.
//!
//! Domain code returns [`AuthError`] or [`StorageError`]; HTTP handlers
//! return [`AppError`], which carries the response status and renders as
//! `{"error": "<message>"}`.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failures of the code-issuance and token lifecycle.
///
/// The kinds stay distinct all the way to the HTTP boundary so that the
/// response status can be chosen per kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The identity is not on the administrator allow-list.
    #[error("{0} is not an administrator")]
    NotAdmin(String),
    /// The email transport rejected the message.
    #[error("failed to deliver auth code: {0}")]
    DeliveryFailed(String),
    /// The code is wrong, absent, or expired.
    #[error("wrong or expired code")]
    WrongCode,
    /// Bad signature, malformed structure, unexpected algorithm or token kind.
    #[error("invalid token")]
    InvalidToken,
    /// Signature is valid but the expiry claim has passed.
    #[error("token has expired")]
    ExpiredToken,
    /// The signing key could not produce a token. This is a configuration fault.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Errors surfaced by the event storage capability.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The write would break a stored invariant.
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Backend(#[from] Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = %self.error, "Request failed");
        }

        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::NotAdmin(_) => StatusCode::FORBIDDEN,
            AuthError::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            AuthError::WrongCode | AuthError::InvalidToken | AuthError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => Self::not_found(err),
            StorageError::Invalid(_) => Self::unprocessable(err),
            StorageError::Backend(_) => Self::internal(err),
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}
