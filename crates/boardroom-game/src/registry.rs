//! Session registry: the server-wide index of live sessions.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{GameError, SessionHandle, SessionId};

/// Tracks every session that has not finished yet.
///
/// The matchmaker inserts a session when it pairs two players; the
/// session removes itself when its game ends. Lookups clone the handle so
/// callers never hold the lock across a session call.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a session.
    ///
    /// Session ids come from connection ids, so a collision only happens
    /// with a session that has already stopped; such a stale entry is
    /// replaced. A collision with a live session is an error.
    pub async fn register(&self, handle: SessionHandle) -> Result<(), GameError> {
        let session_id = handle.session_id();
        let mut sessions = self.sessions.lock().await;

        if let Some(existing) = sessions.get(&session_id) {
            if !existing.is_finished() {
                return Err(GameError::AlreadyRegistered(session_id));
            }
            tracing::warn!(%session_id, "replacing stale session entry");
        }

        sessions.insert(session_id, handle);
        tracing::debug!(%session_id, live = sessions.len(), "session registered");
        Ok(())
    }

    /// Removes a session, returning its handle if it was present.
    pub async fn remove(&self, session_id: SessionId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.remove(&session_id);
        if removed.is_some() {
            tracing::debug!(%session_id, live = sessions.len(), "session removed");
        }
        removed
    }

    /// Returns a handle to a live session.
    pub async fn get(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.sessions.lock().await.get(&session_id).cloned()
    }

    pub async fn contains(&self, session_id: SessionId) -> bool {
        self.sessions.lock().await.contains_key(&session_id)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Ids of all live sessions, sorted.
    pub async fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.lock().await.keys().copied().collect();
        ids.sort();
        ids
    }
}
