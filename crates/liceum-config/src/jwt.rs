use std::env;

use crate::env_parse;

/// Access tokens live 15 minutes.
pub const DEFAULT_ACCESS_EXPIRY: i64 = 15 * 60;
/// Refresh tokens live 15 days.
pub const DEFAULT_REFRESH_EXPIRY: i64 = 15 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: env_parse("JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_EXPIRY),
            refresh_token_expiry: env_parse("JWT_REFRESH_EXPIRY", DEFAULT_REFRESH_EXPIRY),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "your-secret-key-change-in-production".to_string(),
            access_token_expiry: DEFAULT_ACCESS_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_EXPIRY,
        }
    }
}
