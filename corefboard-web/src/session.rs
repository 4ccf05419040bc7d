//! Server-side session storage
//!
//! Sessions are held in process memory only; restarting the server logs
//! everyone out. Entries expire after the same lifetime as the session
//! cookie and are purged on access, so a stolen token stops working
//! server-side once the cookie would have lapsed client-side.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Session lifetime, matching the cookie Max-Age
pub const SESSION_TTL_SECS: u64 = 3600;

/// The authenticated identity carried through protected requests
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

struct SessionEntry {
    user: SessionUser,
    created: Instant,
}

/// Token-to-user map shared across request handlers
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::from_secs(SESSION_TTL_SECS),
        }
    }

    #[cfg(test)]
    fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a session and return its token
    pub fn create(&self, user: SessionUser) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(43)
            .map(char::from)
            .collect();

        let mut sessions = self.inner.lock().expect("session store lock poisoned");
        sessions.insert(
            token.clone(),
            SessionEntry {
                user,
                created: Instant::now(),
            },
        );
        token
    }

    /// Look up the user for `token`, purging the entry if it has expired
    pub fn lookup(&self, token: &str) -> Option<SessionUser> {
        let mut sessions = self.inner.lock().expect("session store lock poisoned");
        match sessions.get(token) {
            Some(entry) if entry.created.elapsed() < self.ttl => Some(entry.user.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, token: &str) {
        let mut sessions = self.inner.lock().expect("session store lock poisoned");
        sessions.remove(token);
    }
}
