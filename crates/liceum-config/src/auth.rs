//! Administrator allow-list and one-time code policy.
//!
//! # Environment Variables
//!
//! - `ADMIN_EMAILS`: comma-separated allow-list (required for any login to work)
//! - `AUTH_CODE_TTL`: code lifetime in seconds (default: 60)
//! - `AUTH_CODE_SINGLE_USE`: drop a code after its first successful match (default: false)

use std::env;

use crate::{env_flag, env_parse};

pub const DEFAULT_CODE_TTL: i64 = 60;

#[derive(Clone, Debug)]
pub struct AuthCodeConfig {
    pub admin_emails: Vec<String>,
    pub code_ttl: i64,
    pub single_use: bool,
}

impl AuthCodeConfig {
    pub fn from_env() -> Self {
        Self {
            admin_emails: parse_email_list(&env::var("ADMIN_EMAILS").unwrap_or_default()),
            code_ttl: env_parse("AUTH_CODE_TTL", DEFAULT_CODE_TTL),
            single_use: env_flag("AUTH_CODE_SINGLE_USE", false),
        }
    }

    pub fn with_admins<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admin_emails: admins.into_iter().map(Into::into).collect(),
            code_ttl: DEFAULT_CODE_TTL,
            single_use: false,
        }
    }

    /// Case-insensitive membership test against the allow-list.
    pub fn is_admin(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.admin_emails
            .iter()
            .any(|admin| normalize_email(admin) == email)
    }
}

/// Trims and lowercases an email so allow-list entries, store keys and
/// token claims all compare equal.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
