//! services/api/src/adapters/session_store.rs
//!
//! Implementations of the `SessionStore` port: Redis for deployments and an
//! in-process map for local development and tests.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, RedisError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, error};
use tutor_core::ports::{PortError, PortResult, SessionStore};

/// Entries expire after 24 hours.
pub const SESSION_TTL: Duration = Duration::from_secs(86_400);

fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

//=========================================================================================
// Redis
//=========================================================================================

/// A `SessionStore` over one multiplexed Redis connection, opened once at startup.
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: MultiplexedConnection,
}

impl RedisSessionStore {
    /// Opens the connection. Fails if Redis cannot be reached.
    pub async fn connect(redis_url: &str) -> PortResult<Self> {
        let client = redis::Client::open(redis_url).map_err(map_redis_error)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;
        Ok(Self { connection })
    }
}

fn map_redis_error(e: RedisError) -> PortError {
    error!("Redis error: {}", e);
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        PortError::Unavailable("Session storage not available".to_string())
    } else {
        PortError::Unexpected(format!("Session storage error: {}", e))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, session_id: &str, payload: &str, ttl: Duration) -> PortResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(session_key(session_id), payload, ttl.as_secs())
            .await
            .map_err(map_redis_error)?;
        debug!(session_id, "Session saved.");
        Ok(())
    }

    async fn load(&self, session_id: &str) -> PortResult<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<String>>(session_key(session_id))
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, session_id: &str) -> PortResult<()> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(session_key(session_id))
            .await
            .map_err(map_redis_error)?;
        debug!(session_id, "Session deleted.");
        Ok(())
    }
}

//=========================================================================================
// In-Memory
//=========================================================================================

/// A process-local `SessionStore`. Expired entries are dropped lazily on access.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<String, (String, Instant)>>> {
        self.entries
            .lock()
            .map_err(|_| PortError::Unexpected("Session map poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session_id: &str, payload: &str, ttl: Duration) -> PortResult<()> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(session_key(session_id), (payload.to_string(), now + ttl));
        Ok(())
    }

    async fn load(&self, session_id: &str) -> PortResult<Option<String>> {
        let key = session_key(session_id);
        let mut entries = self.lock()?;
        match entries.get(&key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(&key);
                Ok(None)
            }
            Some((payload, _)) => Ok(Some(payload.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &str) -> PortResult<()> {
        self.lock()?.remove(&session_key(session_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saved_payload_comes_back_verbatim() {
        let store = InMemorySessionStore::new();
        let payload = r#"{ "b": 1,  "a": [true, null] }"#;
        store.save("s1", payload, SESSION_TTL).await.unwrap();
        assert_eq!(store.load("s1").await.unwrap().as_deref(), Some(payload));
    }

    #[tokio::test]
    async fn unknown_and_deleted_sessions_load_as_none() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.load("missing").await.unwrap(), None);

        store.save("s1", "{}", SESSION_TTL).await.unwrap();
        store.delete("s1").await.unwrap();
        assert_eq!(store.load("s1").await.unwrap(), None);

        // Deleting twice is fine.
        store.delete("s1").await.unwrap();
    }

    #[tokio::test]
    async fn expired_entries_are_dropped() {
        let store = InMemorySessionStore::new();
        store.save("s1", "{}", Duration::ZERO).await.unwrap();
        assert_eq!(store.load("s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn saving_sweeps_expired_sessions_that_were_never_read() {
        let store = InMemorySessionStore::new();
        store.save("stale-1", "{}", Duration::ZERO).await.unwrap();
        store.save("stale-2", "{}", Duration::ZERO).await.unwrap();
        store.save("fresh", "{}", SESSION_TTL).await.unwrap();

        let entries = store.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&session_key("fresh")));
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(session_key("abc"), "session:abc");
    }
}
