//! Per-browser UI sessions.
//!
//! Each visitor gets its own [`UiState`] keyed by a random v4 UUID carried in
//! a cookie. Ids the store did not hand out (or that have expired) are never
//! reused; the visitor gets a fresh session instead.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::controller::UiState;

pub const SESSION_COOKIE: &str = "newscheck_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60 * 60),
            max_sessions: 1000,
        }
    }
}

/// UI state of one visitor plus the tickets used to drop superseded responses.
#[derive(Default)]
pub struct Session {
    pub(crate) state: Mutex<UiState>,
    pub(crate) history_generation: AtomicU64,
    pub(crate) analysis_generation: AtomicU64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> UiState {
        self.state.lock().await.clone()
    }
}

struct Entry {
    session: Arc<Session>,
    last_seen: Instant,
}

pub struct SessionStore {
    limits: SessionLimits,
    entries: Mutex<HashMap<SessionId, Entry>>,
}

impl SessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            limits,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the live session for `id`, or a new one under a new id.
    pub async fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, Arc<Session>) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let idle_timeout = self.limits.idle_timeout;
        entries.retain(|_, entry| now.duration_since(entry.last_seen) < idle_timeout);

        if let Some(id) = id {
            if let Some(entry) = entries.get_mut(&id) {
                entry.last_seen = now;
                return (id, Arc::clone(&entry.session));
            }
        }

        while entries.len() >= self.limits.max_sessions.max(1) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    debug!(session = %oldest, "evicting least recently used session");
                    entries.remove(&oldest);
                }
                None => break,
            }
        }

        let id = SessionId::generate();
        let session = Arc::new(Session::new());
        entries.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        debug!(session = %id, live = entries.len(), "session opened");
        (id, session)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(idle_timeout: Duration, max_sessions: usize) -> SessionStore {
        SessionStore::new(SessionLimits { idle_timeout, max_sessions })
    }

    #[test]
    fn session_id_parses_its_display_form() {
        let id = SessionId::generate();
        assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[tokio::test]
    async fn known_id_returns_same_session() {
        let store = store(Duration::from_secs(60), 10);
        let (id, first) = store.get_or_create(None).await;
        let (again, second) = store.get_or_create(Some(id)).await;
        assert_eq!(again, id);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn unknown_id_gets_a_fresh_session() {
        let store = store(Duration::from_secs(60), 10);
        let forged = SessionId::generate();
        let (id, _) = store.get_or_create(Some(forged)).await;
        assert_ne!(id, forged);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = store(Duration::ZERO, 10);
        let (id, _) = store.get_or_create(None).await;
        let (next, _) = store.get_or_create(Some(id)).await;
        assert_ne!(next, id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn least_recently_used_session_is_evicted_at_capacity() {
        let store = store(Duration::from_secs(60), 2);
        let (a, _) = store.get_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let (b, _) = store.get_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        // Touch `a` so `b` becomes the oldest.
        store.get_or_create(Some(a)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let (c, _) = store.get_or_create(None).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get_or_create(Some(a)).await.0, a);
        assert_eq!(store.get_or_create(Some(c)).await.0, c);
        assert_ne!(store.get_or_create(Some(b)).await.0, b);
    }
}
