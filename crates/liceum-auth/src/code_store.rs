//! In-memory store for one-time login codes.
//!
//! Holds at most one live code per identity. Issuing a new code replaces the
//! previous one (last write wins). Entries are not persisted and do not
//! survive a restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::{Clock, SystemClock};

/// A code together with the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Generates a 6-digit numeric code in `100000..=999999`.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

#[derive(Debug)]
pub struct CodeStore {
    codes: RwLock<HashMap<String, OneTimeCode>>,
    ttl: Duration,
    single_use: bool,
    clock: Arc<dyn Clock>,
}

impl CodeStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: RwLock::new(HashMap::new()),
            ttl,
            single_use: false,
            clock,
        }
    }

    /// When enabled, a successful match removes the code so it cannot be replayed.
    pub fn single_use(mut self, enabled: bool) -> Self {
        self.single_use = enabled;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `code` for `identity`, replacing any earlier code.
    pub async fn set_code(&self, identity: &str, code: &str) {
        let entry = OneTimeCode {
            value: code.to_string(),
            expires_at: self.clock.now() + self.ttl,
        };
        self.codes.write().await.insert(identity.to_string(), entry);
    }

    /// Returns true iff a live code for `identity` equals `code`.
    ///
    /// An expired entry is removed as a side effect.
    pub async fn verify_code(&self, identity: &str, code: &str) -> bool {
        let now = self.clock.now();

        {
            let codes = self.codes.read().await;
            match codes.get(identity) {
                None => return false,
                Some(entry) if !entry.is_expired(now) => {
                    let matches = entry.value == code;
                    if !(matches && self.single_use) {
                        return matches;
                    }
                }
                Some(_) => {}
            }
        }

        // The entry may have been replaced between dropping the read lock and
        // taking the write lock, so everything is decided again here.
        let mut codes = self.codes.write().await;
        match codes.get(identity) {
            None => false,
            Some(entry) if entry.is_expired(now) => {
                debug!(auth.email = %identity, "Removing expired code");
                codes.remove(identity);
                false
            }
            Some(entry) if entry.value == code => {
                if self.single_use {
                    codes.remove(identity);
                }
                true
            }
            Some(_) => false,
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, entry| !entry.is_expired(now));
        before - codes.len()
    }

    pub async fn contains(&self, identity: &str) -> bool {
        self.codes.read().await.contains_key(identity)
    }

    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }
}
