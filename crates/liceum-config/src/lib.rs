//! # Liceum Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing key and validity windows
//! - [`auth`]: administrator allow-list and one-time code policy
//! - [`email`]: SMTP settings
//! - [`cors`]: allowed origins
//! - [`server`]: listener address and maintenance cadence
//!
//! # Example
//!
//! ```ignore
//! use liceum_config::{AuthCodeConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let auth_config = AuthCodeConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod email;
pub mod jwt;
pub mod server;

pub use auth::{AuthCodeConfig, normalize_email};
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
