//! Unified error type for Seatrelay.

use seatrelay_lobby::LobbyError;
use seatrelay_protocol::ProtocolError;
use seatrelay_session::SessionError;
use seatrelay_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown room, full, not a member).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A lobby-level error (refused join or action).
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
