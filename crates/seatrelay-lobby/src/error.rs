//! Error types for the lobby layer.

use seatrelay_protocol::RoomCode;
use seatrelay_session::SessionError;

/// Errors that can occur during lobby operations.
///
/// Every variant is a rejection of one client request. The `Display` text
/// is sent back to that client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The session layer refused the request.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A join was refused; wraps the underlying reason with the room
    /// the client asked for.
    #[error("Cannot join game '{code}': {source}")]
    Join {
        code: RoomCode,
        #[source]
        source: SessionError,
    },
}

impl LobbyError {
    /// `true` if this is a refused join, which clients expect as
    /// `JOIN_FAILURE` rather than `FAILURE`.
    pub fn is_join_failure(&self) -> bool {
        matches!(self, Self::Join { .. })
    }

    /// The session-layer reason behind this error.
    pub fn reason(&self) -> &SessionError {
        match self {
            Self::Session(err) | Self::Join { source: err, .. } => err,
        }
    }
}
