//! A connected player occupying one seat.

use seatrelay_protocol::{RosterEntry, ServerMessage};
use seatrelay_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel for delivering outbound messages to one connection.
///
/// Unbounded so that pushing a broadcast never waits on a slow socket;
/// the connection's own task drains it onto the wire.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// One connected identity inside a session.
///
/// The `connection` id and its `outbox` are this seat's exclusive handle
/// on the live connection. Host and readiness flags are maintained by the
/// [`Roster`](crate::Roster), not set directly.
#[derive(Debug)]
pub struct Participant {
    connection: ConnectionId,
    outbox: Outbox,
    name: String,
    pub(crate) is_ready: bool,
    pub(crate) is_host: bool,
    pub(crate) wins: u32,
}

impl Participant {
    /// A fresh, not-ready, non-host participant with no wins.
    pub fn new(
        connection: ConnectionId,
        outbox: Outbox,
        name: impl Into<String>,
    ) -> Self {
        Self {
            connection,
            outbox,
            name: name.into(),
            is_ready: false,
            is_host: false,
            wins: 0,
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// Pushes a message to this participant's connection.
    ///
    /// Returns `false` if the connection task is gone. The seat itself is
    /// cleaned up by that connection's close event, not here.
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.outbox.send(msg).is_ok()
    }

    /// The public projection shown to every member of the room.
    pub fn roster_entry(&self) -> RosterEntry {
        RosterEntry {
            is_ready: self.is_ready,
            is_host: self.is_host,
            wins: self.wins,
            name: self.name.clone(),
        }
    }
}
