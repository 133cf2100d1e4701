//! Matchmaker: pairs connections into sessions in arrival order.

use std::sync::Arc;

use boardroom_transport::ConnectionId;
use tokio::sync::Mutex;

use crate::{GameError, GameSession, Participant, SessionId, SessionRegistry};

/// Default capacity of each session's move queue.
const DEFAULT_MOVE_BUFFER: usize = 64;

/// What happened to a newly connected participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Nobody was waiting; this participant now holds the waiting slot.
    Waiting,
    /// Paired with the waiting participant into a new session.
    Paired(SessionId),
}

/// First-come-first-paired matchmaking with a single waiting slot.
///
/// The slot and the session start happen under one lock, so no
/// participant can be paired twice or land in two sessions. The earlier
/// arrival always takes seat 0.
#[derive(Debug)]
pub struct Matchmaker {
    waiting: Mutex<Option<Participant>>,
    registry: Arc<SessionRegistry>,
    move_buffer: usize,
}

impl Matchmaker {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            waiting: Mutex::new(None),
            registry,
            move_buffer: DEFAULT_MOVE_BUFFER,
        }
    }

    /// Sets the move queue capacity for sessions started from now on.
    pub fn with_move_buffer(mut self, move_buffer: usize) -> Self {
        self.move_buffer = move_buffer.max(1);
        self
    }

    /// Returns the registry sessions are recorded in.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Seats a new connection: either it waits, or it starts a session
    /// with whoever was waiting.
    ///
    /// A waiting participant whose connection has already gone is
    /// discarded rather than paired.
    pub async fn on_connect(&self, participant: Participant) -> Result<Pairing, GameError> {
        let mut waiting = self.waiting.lock().await;

        let Some(first) = waiting.take().filter(Participant::is_connected) else {
            tracing::info!(conn_id = %participant.id(), "participant waiting for an opponent");
            *waiting = Some(participant);
            return Ok(Pairing::Waiting);
        };

        let (handle, session) =
            GameSession::new([first, participant], self.move_buffer, Arc::clone(&self.registry));
        let session_id = handle.session_id();
        self.registry.register(handle).await?;
        tokio::spawn(session.run());

        tracing::info!(%session_id, "participants paired");
        Ok(Pairing::Paired(session_id))
    }

    /// Clears the waiting slot if `id` holds it.
    ///
    /// Returns `false` when `id` was not waiting, which means it either
    /// was seated in a session or never reached the matchmaker.
    pub async fn on_disconnect(&self, id: ConnectionId) -> bool {
        let mut waiting = self.waiting.lock().await;
        if waiting.as_ref().is_some_and(|p| p.id() == id) {
            *waiting = None;
            tracing::info!(conn_id = %id, "waiting participant left");
            true
        } else {
            false
        }
    }

    /// The connection currently holding the waiting slot.
    pub async fn waiting_id(&self) -> Option<ConnectionId> {
        self.waiting.lock().await.as_ref().map(Participant::id)
    }
}
