//! Wire types: every value that travels between a client and the server.
//!
//! Events are JSON objects with an `event` name and an optional `data`
//! payload, e.g. `{"event":"turn start","data":0}`. Serde's "adjacently
//! tagged" representation (`tag = "event", content = "data"`) produces
//! exactly that shape.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

/// A participant's fixed position in turn order within a session.
///
/// The seat is also the occupant tag written into the board cells the
/// player claims. Serialized as a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Seat(pub u8);

impl Seat {
    /// Returns the seat as an index into a participant list.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One square of the board.
///
/// On the wire an empty cell is `-1` and an occupied cell is the
/// occupant's seat number, so a fresh 3×3 board is
/// `[[-1,-1,-1],[-1,-1,-1],[-1,-1,-1]]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i8", into = "i8")]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Seat),
}

impl Cell {
    /// Returns the occupant, if any.
    pub fn occupant(self) -> Option<Seat> {
        match self {
            Self::Empty => None,
            Self::Occupied(seat) => Some(seat),
        }
    }
}

impl From<i8> for Cell {
    fn from(raw: i8) -> Self {
        match u8::try_from(raw) {
            Ok(seat) => Self::Occupied(Seat(seat)),
            Err(_) => Self::Empty,
        }
    }
}

impl From<Cell> for i8 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => -1,
            // Seats are bounded by the player count, far below i8::MAX.
            Cell::Occupied(Seat(seat)) => seat as i8,
        }
    }
}

/// A full board snapshot, row by row (`snapshot[y][x]`).
pub type BoardSnapshot = Vec<Vec<Cell>>;

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// A board coordinate exactly as the client sent it.
///
/// Clients are untrusted, so a coordinate may be anything JSON can hold.
/// Decoding never fails because of a bad coordinate: values that are not
/// integers (`"a"`, `1.5`, `null`, `[0]`) become a malformed coordinate and
/// the board simply treats the move as illegal.
///
/// Well-formed values are integral numbers (`2`, `2.0`) and strings holding
/// a decimal integer (`"2"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coord(Option<i64>);

impl Coord {
    /// A coordinate that failed to parse.
    pub const MALFORMED: Coord = Coord(None);

    /// Returns the integer value, or `None` when the input was malformed.
    pub fn value(self) -> Option<i64> {
        self.0
    }

    /// Returns the value as an index into `0..len`, if it is in range.
    pub fn index(self, len: usize) -> Option<usize> {
        let v = usize::try_from(self.0?).ok()?;
        (v < len).then_some(v)
    }
}

impl From<i64> for Coord {
    fn from(v: i64) -> Self {
        Self(Some(v))
    }
}

impl From<i32> for Coord {
    fn from(v: i32) -> Self {
        Self(Some(i64::from(v)))
    }
}

impl From<usize> for Coord {
    fn from(v: usize) -> Self {
        Self(i64::try_from(v).ok())
    }
}

/// Largest integer an `f64` represents exactly (2^53).
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Everything a client might put where a coordinate belongs.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoord {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = match RawCoord::deserialize(deserializer)? {
            RawCoord::Int(v) => Some(v),
            RawCoord::Float(f)
                if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT =>
            {
                Some(f as i64)
            }
            RawCoord::Float(_) => None,
            RawCoord::Text(s) => s.parse().ok(),
            RawCoord::Other(_) => None,
        };
        Ok(Self(value))
    }
}

impl Serialize for Coord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How a session ended.
///
/// JSON: `{"winner":0}`, `"draw"` or `"aborted"`. The two sentinels can
/// never be confused with a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A seat completed a line.
    Winner(Seat),
    /// The board filled up with no line.
    Draw,
    /// A participant disconnected before the game was decided.
    Aborted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner(seat) => write!(f, "winner {seat}"),
            Self::Draw => write!(f, "draw"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Claim the cell at column `x`, row `y`: `{"event":"move","data":[x,y]}`.
    #[serde(rename = "move")]
    Move(Coord, Coord),
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Both seats are filled and play is about to begin.
    #[serde(rename = "game start")]
    GameStart,

    /// The full board after a change (and once at game start).
    #[serde(rename = "board")]
    Board(BoardSnapshot),

    /// Sent to one player: it is now this seat's turn.
    #[serde(rename = "turn start")]
    TurnStart(Seat),

    /// Sent to the mover once their move has been applied.
    #[serde(rename = "turn end")]
    TurnEnd(Seat),

    /// The session is over.
    #[serde(rename = "game end")]
    GameEnd(Outcome),
}

// =========================================================================
// Tests
// =========================================================================
