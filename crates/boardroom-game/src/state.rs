//! Session lifecycle state.

use std::fmt;

use boardroom_protocol::Outcome;

/// The lifecycle state of a game session.
///
/// ```text
/// InProgress ──(line / full board / disconnect)──→ Finished(outcome)
/// ```
///
/// `Finished` is terminal: once a session has an outcome it never moves
/// again and never mutates its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Finished(Outcome),
}

impl SessionState {
    /// Returns `true` once the session has an outcome.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// Returns the outcome of a finished session.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::InProgress => None,
            Self::Finished(outcome) => Some(*outcome),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished(outcome) => write!(f, "Finished({outcome})"),
        }
    }
}
