//! Game layer for Boardroom.
//!
//! Pairs connections two at a time and runs each pair's game as an
//! isolated Tokio task (actor model).
//!
//! # Key types
//!
//! - [`Board`] — grid state, move legality, win/draw evaluation
//! - [`Matchmaker`] — the single waiting slot and session start
//! - [`GameSession`] — the per-game actor; [`SessionHandle`] talks to it
//! - [`SessionRegistry`] — index of live sessions
//! - [`SessionState`] — lifecycle state machine

mod board;
mod error;
mod matchmaker;
mod registry;
mod session;
mod state;

pub use board::{BOARD_SIZE, Board, Verdict};
pub use error::GameError;
pub use matchmaker::{Matchmaker, Pairing};
pub use registry::SessionRegistry;
pub use session::{
    GameSession, Outbound, Participant, PlayerSender, SEATS, SeatBinding, SessionHandle,
    SessionId, SessionInfo,
};
pub use state::SessionState;
