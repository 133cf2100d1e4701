//! # Boardroom
//!
//! A server for two-player, turn-based board games played over WebSocket.
//!
//! Connections are paired in arrival order. Each pair gets its own game
//! session running as an isolated Tokio task; the server referees every
//! move, announces turns, and reports the outcome. A player who
//! disconnects mid-game aborts that game.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn start() -> Result<(), boardroom::BoardroomError> {
//! // Listens on 0.0.0.0:10101 until the process ends.
//! boardroom::serve(10101).await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::BoardroomError;
pub use server::{BoardroomServer, BoardroomServerBuilder, DEFAULT_PORT, serve};

/// Convenient imports for running a server and talking to it.
pub mod prelude {
    pub use crate::{BoardroomError, BoardroomServer, BoardroomServerBuilder, DEFAULT_PORT, serve};
    pub use boardroom_game::{Board, SessionId, SessionInfo, SessionRegistry, SessionState, Verdict};
    pub use boardroom_protocol::{
        BoardSnapshot, Cell, ClientEvent, Codec, Coord, JsonCodec, Outcome, Seat, ServerEvent,
    };
}
