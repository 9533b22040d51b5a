//! Process-local `SessionStore` keeping session state on the server.
//!
//! The cookie only carries an opaque key. Deleting the entry ends the session
//! for every copy of the cookie, and entries past their TTL read as absent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rand::Rng;
use rand::distributions::Alphanumeric;

const SESSION_KEY_LEN: usize = 64;

type SessionState = HashMap<String, String>;

#[derive(Debug)]
struct Entry {
    state: SessionState,
    expires_at: DateTime<Utc>,
}

/// Mutex-guarded map from session key to state and expiry.
///
/// Clones share the same map, so one store can back every worker.
#[derive(Clone)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    /// Create an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let now = self.clock.utc();
        self.lock()
            .map(|entries| entries.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    /// Whether no live session is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))
    }

    fn expiry(&self, ttl: &Duration) -> DateTime<Utc> {
        let ttl = TimeDelta::try_seconds(ttl.whole_seconds()).unwrap_or_default();
        self.clock.utc() + ttl
    }

    /// Insert `state` under a fresh key, dropping expired entries first.
    fn insert_fresh(&self, state: SessionState, ttl: &Duration) -> anyhow::Result<SessionKey> {
        let expires_at = self.expiry(ttl);
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        entries.retain(|_, entry| entry.expires_at > now);
        let key = loop {
            let candidate = generate_key();
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };
        entries.insert(key.clone(), Entry { state, expires_at });
        SessionKey::try_from(key).map_err(|_| anyhow::anyhow!("generated session key rejected"))
    }
}

fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LEN)
        .map(char::from)
        .collect()
}

impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let now = self.clock.utc();
        let mut entries = self.lock().map_err(LoadError::Other)?;
        let live = entries
            .get(session_key.as_ref())
            .map(|entry| (entry.expires_at > now).then(|| entry.state.clone()));
        match live {
            Some(Some(state)) => Ok(Some(state)),
            Some(None) => {
                entries.remove(session_key.as_ref());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        self.insert_fresh(session_state, ttl).map_err(SaveError::Other)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        let expires_at = self.expiry(ttl);
        let now = self.clock.utc();
        {
            let mut entries = self.lock().map_err(UpdateError::Other)?;
            if let Some(entry) = entries
                .get_mut(session_key.as_ref())
                .filter(|entry| entry.expires_at > now)
            {
                entry.state = session_state;
                entry.expires_at = expires_at;
                return Ok(session_key);
            }
        }
        // Deleted or expired keys are never revived.
        self.insert_fresh(session_state, ttl).map_err(UpdateError::Other)
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> anyhow::Result<()> {
        let expires_at = self.expiry(ttl);
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        if let Some(entry) = entries
            .get_mut(session_key.as_ref())
            .filter(|entry| entry.expires_at > now)
        {
            entry.expires_at = expires_at;
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> anyhow::Result<()> {
        self.lock()?.remove(session_key.as_ref());
        Ok(())
    }
}
