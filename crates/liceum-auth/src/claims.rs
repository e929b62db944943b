//! JWT claim structures.
//!
//! Both token roles share one claim set; [`TokenKind`] tells them apart so
//! a refresh token cannot be presented as an access token and vice versa.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity the token was issued to
    pub email: String,
    pub kind: TokenKind,
    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
    /// Issued-at (Unix timestamp, seconds)
    pub iat: i64,
    /// Unique token id, keeps tokens issued within the same second distinct
    pub jti: String,
}

/// Access + refresh pair returned by code verification and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// Short-lived token for admin requests
    pub access: String,
    /// Long-lived token exchanged for a new pair
    pub refresh: String,
}
