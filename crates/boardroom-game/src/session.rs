//! Game session actor: an isolated Tokio task that referees one game.
//!
//! Each session owns its board and turn pointer and is stepped by two
//! inbound queues: moves (with info requests) and departures. Nothing is
//! shared with other sessions, so no locking is needed here.
//!
//! ```text
//! connection task ──move──→ ┐
//!                           ├─→ GameSession ──Outbound──→ connection tasks
//! connection task ──leave─→ ┘
//! ```

use std::fmt;
use std::sync::Arc;

use boardroom_protocol::{BoardSnapshot, Coord, Outcome, Seat, ServerEvent};
use boardroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{Board, GameError, SessionRegistry, SessionState, Verdict};

/// Number of players in a session.
pub const SEATS: usize = 2;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifier of a session, taken from the connection id of seat 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl From<ConnectionId> for SessionId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// A message from the game layer to one connection task.
#[derive(Debug)]
pub enum Outbound {
    /// The connection now sits at this seat of a session. Always the
    /// first message a seated connection receives.
    Seated(SeatBinding),
    /// A wire event to forward to the client.
    Event(ServerEvent),
}

/// Channel sender for delivering outbound messages to a connection task.
pub type PlayerSender = mpsc::UnboundedSender<Outbound>;

/// A connected player as seen by the game layer.
///
/// Holds the sending half of the connection task's outbound queue. When
/// the session drops its participants, the connection task sees its
/// queue close and stops routing moves.
#[derive(Debug)]
pub struct Participant {
    id: ConnectionId,
    sender: PlayerSender,
}

impl Participant {
    /// Wraps a connection's id and outbound queue.
    pub fn new(id: ConnectionId, sender: PlayerSender) -> Self {
        Self { id, sender }
    }

    /// Returns the connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `false` once the connection task has gone away.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Sends to the connection task. A vanished task is ignored: its
    /// departure reaches the session through [`SessionHandle::leave`].
    fn deliver(&self, msg: Outbound) {
        let _ = self.sender.send(msg);
    }
}

/// What a connection task needs to act for its seat.
#[derive(Debug, Clone)]
pub struct SeatBinding {
    /// The seat this connection plays.
    pub seat: Seat,
    /// The session the seat belongs to.
    pub session: SessionHandle,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Commands delivered on the session's move queue.
#[derive(Debug)]
enum SessionCommand {
    /// A move attempt from a seat.
    Move { seat: Seat, x: Coord, y: Coord },
    /// Request a snapshot of the session.
    GetInfo { reply: oneshot::Sender<SessionInfo> },
}

/// A snapshot of a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub state: SessionState,
    /// The seat allowed to move next.
    pub turn: Seat,
    pub board: BoardSnapshot,
    /// Connection ids in seat order.
    pub participants: Vec<ConnectionId>,
}

/// Handle to a running session actor. Cheap to clone.
///
/// Every method fails with [`GameError::Unavailable`] once the session
/// has finished, which callers are free to ignore.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    commands: mpsc::Sender<SessionCommand>,
    departures: mpsc::UnboundedSender<Seat>,
}

impl SessionHandle {
    /// Returns the session's id.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Queues a move attempt for `seat`.
    ///
    /// Whether the move is legal (and whether it is that seat's turn) is
    /// decided by the session; an ignored move produces no reply.
    pub async fn submit_move(
        &self,
        seat: Seat,
        x: Coord,
        y: Coord,
    ) -> Result<(), GameError> {
        self.commands
            .send(SessionCommand::Move { seat, x, y })
            .await
            .map_err(|_| GameError::Unavailable(self.session_id))
    }

    /// Reports that the connection at `seat` is gone.
    ///
    /// Synchronous so it can be called from cleanup paths. Departures
    /// take priority over queued moves.
    pub fn leave(&self, seat: Seat) -> Result<(), GameError> {
        self.departures
            .send(seat)
            .map_err(|_| GameError::Unavailable(self.session_id))
    }

    /// Requests a snapshot of the session.
    pub async fn info(&self) -> Result<SessionInfo, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable(self.session_id))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.session_id))
    }

    /// Returns `true` once the session actor has stopped.
    pub fn is_finished(&self) -> bool {
        self.commands.is_closed()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The session actor. Created by [`GameSession::new`], driven by
/// [`GameSession::run`].
pub struct GameSession {
    session_id: SessionId,
    participants: Vec<Participant>,
    board: Board,
    turn: Seat,
    state: SessionState,
    commands: mpsc::Receiver<SessionCommand>,
    departures: mpsc::UnboundedReceiver<Seat>,
    registry: Arc<SessionRegistry>,
}

impl GameSession {
    /// Seats `seats` in order and returns the session with its handle.
    ///
    /// Every participant is sent [`Outbound::Seated`] right away, before
    /// any game event, so a connection that disconnects from here on
    /// knows which session to tell. The game itself starts in
    /// [`run`](Self::run). `move_buffer` bounds the move queue.
    pub fn new(
        seats: [Participant; SEATS],
        move_buffer: usize,
        registry: Arc<SessionRegistry>,
    ) -> (SessionHandle, Self) {
        let session_id = SessionId::from(seats[0].id());
        let (cmd_tx, cmd_rx) = mpsc::channel(move_buffer.max(1));
        let (dep_tx, dep_rx) = mpsc::unbounded_channel();

        let handle = SessionHandle {
            session_id,
            commands: cmd_tx,
            departures: dep_tx,
        };

        for (index, participant) in seats.iter().enumerate() {
            participant.deliver(Outbound::Seated(SeatBinding {
                seat: Seat(index as u8),
                session: handle.clone(),
            }));
        }

        let session = Self {
            session_id,
            participants: Vec::from(seats),
            board: Board::new(),
            turn: Seat(0),
            state: SessionState::InProgress,
            commands: cmd_rx,
            departures: dep_rx,
            registry,
        };
        (handle, session)
    }

    /// Plays the game to its end, then removes the session from the
    /// registry.
    pub async fn run(mut self) {
        let players: Vec<_> = self.participants.iter().map(Participant::id).collect();
        tracing::info!(session_id = %self.session_id, ?players, "game started");

        self.broadcast(ServerEvent::GameStart);
        self.broadcast(ServerEvent::Board(self.board.snapshot()));
        self.begin_turn();

        while !self.state.is_finished() {
            // `biased` polls departures first: a disconnect that has
            // arrived wins over any move still sitting in the queue.
            tokio::select! {
                biased;

                departure = self.departures.recv() => {
                    if let Some(seat) = departure {
                        tracing::info!(
                            session_id = %self.session_id,
                            %seat,
                            "participant disconnected"
                        );
                    }
                    self.finish(Outcome::Aborted);
                }

                command = self.commands.recv() => match command {
                    Some(SessionCommand::Move { seat, x, y }) => {
                        self.handle_move(seat, x, y);
                    }
                    Some(SessionCommand::GetInfo { reply }) => {
                        let _ = reply.send(self.info());
                    }
                    None => self.finish(Outcome::Aborted),
                },
            }
        }

        self.registry.remove(self.session_id).await;
        tracing::info!(session_id = %self.session_id, state = %self.state, "session closed");
    }

    fn handle_move(&mut self, seat: Seat, x: Coord, y: Coord) {
        if seat != self.turn {
            tracing::debug!(
                session_id = %self.session_id,
                %seat,
                turn = %self.turn,
                "move out of turn, ignoring"
            );
            return;
        }

        if !self.board.place(x, y, seat) {
            // No feedback: the same seat simply keeps the turn.
            tracing::debug!(
                session_id = %self.session_id,
                %seat,
                ?x,
                ?y,
                "illegal move, ignoring"
            );
            return;
        }

        self.broadcast(ServerEvent::Board(self.board.snapshot()));
        self.send_to(seat, ServerEvent::TurnEnd(seat));

        match self.board.check_win() {
            Verdict::Winner(winner) => self.finish(Outcome::Winner(winner)),
            Verdict::Draw => self.finish(Outcome::Draw),
            Verdict::Undecided => {
                self.turn = Seat((self.turn.0 + 1) % SEATS as u8);
                self.begin_turn();
            }
        }
    }

    fn begin_turn(&self) {
        tracing::debug!(session_id = %self.session_id, turn = %self.turn, "turn started");
        self.send_to(self.turn, ServerEvent::TurnStart(self.turn));
    }

    /// Moves to `Finished`, announces the outcome, and detaches every
    /// participant. Runs at most once.
    fn finish(&mut self, outcome: Outcome) {
        if self.state.is_finished() {
            return;
        }
        self.state = SessionState::Finished(outcome);
        tracing::info!(session_id = %self.session_id, %outcome, "game finished");

        self.broadcast(ServerEvent::GameEnd(outcome));
        self.participants.clear();
    }

    fn broadcast(&self, event: ServerEvent) {
        for participant in &self.participants {
            participant.deliver(Outbound::Event(event.clone()));
        }
    }

    fn send_to(&self, seat: Seat, event: ServerEvent) {
        if let Some(participant) = self.participants.get(seat.index()) {
            participant.deliver(Outbound::Event(event));
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id,
            state: self.state,
            turn: self.turn,
            board: self.board.snapshot(),
            participants: self.participants.iter().map(Participant::id).collect(),
        }
    }
}
