//! Session Management
//!
//! Keeps per-session state isolated. Each session owns its state behind its
//! own async mutex, so one session runs at most one operation at a time while
//! other sessions proceed independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one session's state
pub struct SessionHandle<S> {
    /// Session the state belongs to
    pub id: SessionId,

    /// Shared state, locked for the duration of an operation
    pub state: Arc<Mutex<S>>,

    /// Whether the session was created by this lookup
    pub created: bool,
}

struct SessionEntry<S> {
    state: Arc<Mutex<S>>,
    last_seen: DateTime<Utc>,
}

/// In-memory registry of isolated sessions
pub struct SessionRegistry<S> {
    sessions: RwLock<HashMap<SessionId, SessionEntry<S>>>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SessionRegistry<S> {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a session by ID, creating fresh state when it is unknown
    ///
    /// Unknown or missing IDs always get a newly generated ID, so a client
    /// cannot choose another session's identifier.
    pub async fn get_or_create(
        &self,
        id: Option<&SessionId>,
        init: impl FnOnce() -> S,
    ) -> SessionHandle<S> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                entry.last_seen = now;
                return SessionHandle {
                    id: id.clone(),
                    state: entry.state.clone(),
                    created: false,
                };
            }
        }

        let id = SessionId::new();
        let state = Arc::new(Mutex::new(init()));
        sessions.insert(
            id.clone(),
            SessionEntry {
                state: state.clone(),
                last_seen: now,
            },
        );
        tracing::debug!(session = %id, "Session created");

        SessionHandle {
            id,
            state,
            created: true,
        }
    }

    /// Look up an existing session
    pub async fn get(&self, id: &SessionId) -> Option<Arc<Mutex<S>>> {
        self.sessions.read().await.get(id).map(|e| e.state.clone())
    }

    /// Drop a session and its state
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Remove sessions idle for longer than `max_idle`; returns how many were removed
    pub async fn prune_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen >= cutoff);
        before - sessions.len()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry: SessionRegistry<Vec<u32>> = SessionRegistry::new();

        let first = registry.get_or_create(None, Vec::new).await;
        let second = registry.get_or_create(None, Vec::new).await;
        assert!(first.created && second.created);
        assert_ne!(first.id, second.id);

        first.state.lock().await.push(1);
        assert!(second.state.lock().await.is_empty());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_existing_session_is_reused() {
        let registry: SessionRegistry<u32> = SessionRegistry::new();
        let handle = registry.get_or_create(None, || 7).await;
        *handle.state.lock().await += 1;

        let again = registry.get_or_create(Some(&handle.id), || 0).await;
        assert!(!again.created);
        assert_eq!(again.id, handle.id);
        assert_eq!(*again.state.lock().await, 8);
    }

    #[tokio::test]
    async fn test_unknown_id_gets_fresh_session() {
        let registry: SessionRegistry<u32> = SessionRegistry::new();
        let forged = SessionId::from_string("not-a-real-session");

        let handle = registry.get_or_create(Some(&forged), || 0).await;
        assert!(handle.created);
        assert_ne!(handle.id, forged);
        assert!(registry.get(&forged).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_and_prune() {
        let registry: SessionRegistry<u32> = SessionRegistry::new();
        let handle = registry.get_or_create(None, || 0).await;
        registry.get_or_create(None, || 1).await;

        assert!(registry.remove(&handle.id).await);
        assert!(!registry.remove(&handle.id).await);
        assert_eq!(registry.len().await, 1);

        assert_eq!(registry.prune_idle(chrono::Duration::zero() - chrono::Duration::seconds(1)).await, 1);
        assert!(registry.is_empty().await);
    }
}
