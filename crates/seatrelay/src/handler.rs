//! Per-connection handler: the bridge between one socket and the lobby.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Send the `SUCCESS "Connected"` acknowledgement
//!   2. Loop: decode inbound frames and dispatch their actions in order,
//!      while draining the connection's outbox onto the socket
//!   3. On close, release the connection's seat (host departure closes
//!      the room)

use std::sync::Arc;

use seatrelay_lobby::Lobby;
use seatrelay_protocol::{ActionBatch, Codec, ServerMessage};
use seatrelay_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::RelayError;
use crate::dispatch::{Caller, dispatch};

/// Drop guard that releases a connection's seat when the handler exits.
///
/// The normal exit path calls [`release`](Self::release) directly. If the
/// handler unwinds or its task is dropped first, `Drop` spawns the
/// disconnect instead, since it cannot await the lobby lock itself.
struct SeatGuard {
    connection: ConnectionId,
    lobby: Option<Arc<Lobby>>,
}

impl SeatGuard {
    fn new(connection: ConnectionId, lobby: Arc<Lobby>) -> Self {
        Self {
            connection,
            lobby: Some(lobby),
        }
    }

    async fn release(mut self) {
        if let Some(lobby) = self.lobby.take() {
            lobby.disconnect(self.connection).await;
        }
    }
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        let Some(lobby) = self.lobby.take() else {
            return;
        };
        let connection = self.connection;
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                lobby.disconnect(connection).await;
            });
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    lobby: Arc<Lobby>,
    codec: Arc<C>,
) -> Result<(), RelayError> {
    let connection = conn.id();
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    let guard = SeatGuard::new(connection, Arc::clone(&lobby));
    let caller = Caller::new(connection, outbox);

    tracing::info!(%connection, "connection opened");
    send(&conn, codec.as_ref(), &ServerMessage::connected()).await?;

    let result = loop {
        tokio::select! {
            frame = conn.recv() => match frame {
                Ok(Some(data)) => {
                    handle_frame(&lobby, codec.as_ref(), &caller, &data).await;
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(RelayError::Transport(e)),
            },
            Some(msg) = inbox.recv() => {
                if let Err(e) = send(&conn, codec.as_ref(), &msg).await {
                    break Err(e);
                }
            }
        }
    };

    guard.release().await;
    let _ = conn.close().await;
    match &result {
        Ok(()) => tracing::info!(%connection, "connection closed"),
        Err(e) => tracing::info!(%connection, error = %e, "connection closed with error"),
    }
    result
}

/// Decodes one inbound frame and dispatches its actions in array order.
///
/// Frames that aren't a JSON array of objects are dropped; unrecognized
/// entries inside an array are skipped.
async fn handle_frame(lobby: &Lobby, codec: &impl Codec, caller: &Caller, data: &[u8]) {
    let batch: ActionBatch = match codec.decode(data) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::debug!(
                connection = %caller.connection,
                error = %e,
                "failed to decode frame"
            );
            return;
        }
    };

    if batch.ignored() > 0 {
        tracing::debug!(
            connection = %caller.connection,
            ignored = batch.ignored(),
            "skipped unrecognized actions"
        );
    }

    for action in batch {
        dispatch(lobby, caller, action).await;
    }
}

async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), RelayError> {
    let text = codec.encode(msg)?;
    conn.send(&text).await?;
    Ok(())
}
