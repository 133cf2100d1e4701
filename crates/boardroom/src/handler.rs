//! Per-connection handler: seating, event forwarding, and move routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Offer the connection to the matchmaker (wait or pair)
//!   2. Loop: forward session events out, route move frames in
//!   3. On close: leave the waiting slot, or tell the session the seat
//!      is gone

use std::sync::Arc;

use boardroom_game::{Outbound, Participant, SeatBinding};
use boardroom_protocol::{ClientEvent, Codec};
use boardroom_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::BoardroomError;
use crate::server::ServerState;

/// Per-connection view of the game: the seat, once the matchmaker has
/// placed this connection in a session.
struct Player {
    conn_id: ConnectionId,
    outbound: UnboundedReceiver<Outbound>,
    outbound_open: bool,
    binding: Option<SeatBinding>,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), BoardroomError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, rx) = mpsc::unbounded_channel();
    let pairing = state
        .matchmaker
        .on_connect(Participant::new(conn_id, tx))
        .await?;
    tracing::debug!(%conn_id, ?pairing, "connection admitted");

    let mut player = Player {
        conn_id,
        outbound: rx,
        outbound_open: true,
        binding: None,
    };

    let result = pump(&conn, &state, &mut player).await;
    depart(&state, player).await;
    let _ = conn.close().await;
    result
}

/// Moves frames both ways until the client goes away.
async fn pump<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    player: &mut Player,
) -> Result<(), BoardroomError> {
    let conn_id = player.conn_id;

    loop {
        tokio::select! {
            outbound = player.outbound.recv(), if player.outbound_open => match outbound {
                Some(Outbound::Seated(binding)) => {
                    tracing::info!(
                        %conn_id,
                        session_id = %binding.session.session_id(),
                        seat = %binding.seat,
                        "connection seated"
                    );
                    player.binding = Some(binding);
                }
                Some(Outbound::Event(event)) => {
                    let bytes = state.codec.encode(&event)?;
                    conn.send(&bytes).await?;
                }
                None => {
                    // The session is over. The socket stays open but moves
                    // no longer go anywhere.
                    tracing::debug!(%conn_id, "released from session");
                    player.outbound_open = false;
                    player.binding = None;
                }
            },

            inbound = conn.recv() => match inbound? {
                Some(data) => route_frame(state, player, &data).await,
                None => {
                    tracing::info!(%conn_id, "connection closed cleanly");
                    return Ok(());
                }
            },
        }
    }
}

/// Decodes one client frame and hands a move to the player's session.
///
/// Nothing here is reported back to the client: undecodable frames,
/// moves before seating, and moves after the game are all dropped.
async fn route_frame<C: Codec>(state: &ServerState<C>, player: &Player, data: &[u8]) {
    let conn_id = player.conn_id;

    let event: ClientEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "failed to decode client event");
            return;
        }
    };

    let ClientEvent::Move(x, y) = event;
    let Some(binding) = &player.binding else {
        tracing::debug!(%conn_id, "move from unseated connection, ignoring");
        return;
    };

    if let Err(e) = binding.session.submit_move(binding.seat, x, y).await {
        tracing::debug!(%conn_id, error = %e, "move not delivered");
    }
}

/// Cleans up after a closed connection.
async fn depart<C: Codec>(state: &ServerState<C>, mut player: Player) {
    let conn_id = player.conn_id;

    let binding = if player.binding.is_some() {
        player.binding.take()
    } else if state.matchmaker.on_disconnect(conn_id).await {
        None
    } else {
        // Seated by the matchmaker after the loop stopped reading.
        pending_binding(&mut player.outbound)
    };

    if let Some(binding) = binding {
        // A session that already finished has nothing to abort.
        let _ = binding.session.leave(binding.seat);
        tracing::debug!(
            %conn_id,
            session_id = %binding.session.session_id(),
            "left session"
        );
    }
}

fn pending_binding(outbound: &mut UnboundedReceiver<Outbound>) -> Option<SeatBinding> {
    while let Ok(msg) = outbound.try_recv() {
        if let Outbound::Seated(binding) = msg {
            return Some(binding);
        }
    }
    None
}
