//! Session persistence keyed by an opaque client token.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use super::Session;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Backend holding sessions between requests.
///
/// Implementations own per-client isolation; callers load, mutate and save a
/// session within a single request.
pub trait SessionStore: Send + Sync {
    fn load<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Session>>;
    fn save<'a>(&'a self, token: &'a str, session: Session) -> StoreFuture<'a, ()>;
}

struct StoredSession {
    session: Session,
    touched_at: Instant,
}

/// In-process store with an idle TTL. Expired entries are pruned on access.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, entry| entry.touched_at.elapsed() < self.ttl);
        sessions.len()
    }
}

impl SessionStore for MemorySessionStore {
    fn load<'a>(&'a self, token: &'a str) -> StoreFuture<'a, Option<Session>> {
        Box::pin(async move {
            let mut sessions = self.sessions.lock().await;
            sessions.retain(|_, entry| entry.touched_at.elapsed() < self.ttl);
            Ok(sessions.get_mut(token).map(|entry| {
                entry.touched_at = Instant::now();
                entry.session.clone()
            }))
        })
    }

    fn save<'a>(&'a self, token: &'a str, session: Session) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut sessions = self.sessions.lock().await;
            sessions.insert(
                token.to_string(),
                StoredSession {
                    session,
                    touched_at: Instant::now(),
                },
            );
            Ok(())
        })
    }
}

/// Create a new session token for the session cookie.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
