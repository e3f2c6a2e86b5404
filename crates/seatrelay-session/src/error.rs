//! Error types for the session layer.

use seatrelay_protocol::RoomCode;

/// Errors that can occur while resolving or mutating a room session.
///
/// The `Display` text is what the offending client sees in its `FAILURE`
/// or `JOIN_FAILURE` message, so it names the room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No live session has this code.
    #[error("Game '{0}' does not exist")]
    NotFound(RoomCode),

    /// The requesting connection holds no seat in this session.
    #[error("Socket is not connected to game '{0}'")]
    NotMember(RoomCode),

    /// All seats are taken.
    #[error("Game '{0}' is full")]
    RoomFull(RoomCode),

    /// The match has started; seats are locked until it ends.
    #[error("Game '{0}' is already in progress")]
    InProgress(RoomCode),

    /// The connection already holds a seat (in the named session).
    #[error("Socket is already seated in game '{0}'")]
    AlreadySeated(RoomCode),

    /// A seat index that no participant occupies.
    #[error("Game '{0}' has no player in seat {1}")]
    InvalidSeat(RoomCode, usize),

    /// The allocator could not find a free code. Signals a capacity or RNG
    /// defect; only the create in progress is aborted.
    #[error("no free room code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },
}
