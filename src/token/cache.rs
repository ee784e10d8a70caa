use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Source of the current time, injectable so expiry can be tested
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    acquired_at: DateTime<Utc>,
}

/// In-memory map of session identifier to anti-forgery token
///
/// One token per session, last write wins. Entries older than the freshness
/// window are never handed out and are dropped on the lookup that finds them
/// stale. Nothing is persisted.
pub struct TokenCache {
    entries: Mutex<HashMap<String, CachedToken>>,
    freshness: Duration,
    clock: Box<dyn Clock>,
}

impl TokenCache {
    /// Default freshness window
    pub const DEFAULT_FRESHNESS_SECONDS: i64 = 300;

    #[must_use]
    pub fn new(freshness: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            freshness,
            clock,
        }
    }

    #[must_use]
    pub fn with_system_clock(freshness: Duration) -> Self {
        Self::new(freshness, Box::new(SystemClock))
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CachedToken>> {
        // The map holds plain values, so a poisoned lock is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached token for `session_id`, or `None` if absent or stale
    pub fn lookup(&self, session_id: &str) -> Option<String> {
        let now = self.clock.now();
        let mut entries = self.entries();

        let entry = entries.get(session_id)?;
        if now.signed_duration_since(entry.acquired_at) < self.freshness {
            return Some(entry.token.clone());
        }

        entries.remove(session_id);
        log::debug!("Evicted stale anti-forgery token");
        None
    }

    /// Store `token` for `session_id`, replacing any previous entry
    pub fn store(&self, session_id: &str, token: &str) {
        let acquired_at = self.clock.now();
        self.entries().insert(
            session_id.to_string(),
            CachedToken {
                token: token.to_string(),
                acquired_at,
            },
        );
    }

    /// Number of entries currently held, stale ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn freshness(&self) -> Duration {
        self.freshness
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::with_system_clock(Duration::seconds(Self::DEFAULT_FRESHNESS_SECONDS))
    }
}
