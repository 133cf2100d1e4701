//! Wire protocol for Boardroom.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Seat`], [`Cell`],
//!   [`Coord`], [`Outcome`]) — the values that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those values are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! It knows nothing about connections or sessions.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Game (sessions)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    BoardSnapshot, Cell, ClientEvent, Coord, Outcome, Seat, ServerEvent,
};
