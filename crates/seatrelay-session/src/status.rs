//! Session lifecycle status.

use std::fmt;

use seatrelay_protocol::{STATUS_IN_PROGRESS, STATUS_LOBBY};

/// The phase a room is in.
///
/// ```text
/// Lobby ──(START_GAME)──→ InProgress ──(END_GAME)──→ Lobby
/// ```
///
/// Seats can only be taken in the lobby. Teardown is not a status: a
/// torn-down session is removed from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Lobby,
    InProgress,
}

impl SessionStatus {
    /// Returns `true` if new players may take a seat.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` while a match is running.
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// The numeric code mirrored into the game-state payload.
    pub fn wire_code(self) -> u8 {
        match self {
            Self::Lobby => STATUS_LOBBY,
            Self::InProgress => STATUS_IN_PROGRESS,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InProgress => write!(f, "InProgress"),
        }
    }
}
