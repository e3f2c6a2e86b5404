//! Request dispatch: one decoded client action to one lobby operation.
//!
//! A rejected action is answered to the caller alone, as `JOIN_FAILURE`
//! for joins and `FAILURE` for everything else. Successful actions answer
//! through the lobby's fan-out.

use seatrelay_lobby::{Lobby, LobbyError, UpdateKind};
use seatrelay_protocol::{ClientAction, ServerMessage};
use seatrelay_session::Outbox;
use seatrelay_transport::ConnectionId;

/// The connection an action arrived on.
#[derive(Debug, Clone)]
pub struct Caller {
    pub connection: ConnectionId,
    pub outbox: Outbox,
}

impl Caller {
    pub fn new(connection: ConnectionId, outbox: Outbox) -> Self {
        Self { connection, outbox }
    }
}

/// Applies `action` for `caller`, replying to the caller on rejection.
///
/// Returns `true` if the action was applied.
pub async fn dispatch(lobby: &Lobby, caller: &Caller, action: ClientAction) -> bool {
    let name = action.name();
    match apply(lobby, caller, action).await {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(
                connection = %caller.connection,
                action = name,
                error = %err,
                "action rejected"
            );
            if caller.outbox.send(rejection(&err)).is_err() {
                tracing::debug!(
                    connection = %caller.connection,
                    "outbox closed, rejection dropped"
                );
            }
            false
        }
    }
}

/// The message telling a client why its action was refused.
pub fn rejection(err: &LobbyError) -> ServerMessage {
    let message = err.to_string();
    if err.is_join_failure() {
        ServerMessage::JoinFailure { message }
    } else {
        ServerMessage::Failure { message }
    }
}

async fn apply(lobby: &Lobby, caller: &Caller, action: ClientAction) -> Result<(), LobbyError> {
    let connection = caller.connection;
    match action {
        ClientAction::CreateGame { options } => {
            lobby
                .create_session(connection, caller.outbox.clone(), options)
                .await?;
        }
        ClientAction::JoinGame { id, player_name } => {
            lobby
                .join_session(connection, caller.outbox.clone(), &id, player_name)
                .await?;
        }
        ClientAction::MoveUp { id, pos } => lobby.move_up(connection, &id, pos).await?,
        ClientAction::MoveDown { id, pos } => lobby.move_down(connection, &id, pos).await?,
        ClientAction::ReadyUp { id } => lobby.set_ready(connection, &id, true).await?,
        ClientAction::ReadyDown { id } => lobby.set_ready(connection, &id, false).await?,
        ClientAction::StartGame {
            id,
            game_state,
            game_settings,
        } => {
            lobby
                .start_game(connection, &id, game_state, game_settings)
                .await?;
        }
        ClientAction::EndGame { id, winner } => lobby.end_game(connection, &id, winner).await?,
        ClientAction::BroadcastMove { id, game_state } => {
            lobby
                .relay_state(connection, &id, game_state, UpdateKind::Move)
                .await?;
        }
        ClientAction::Broadcast { id, game_state } => {
            lobby
                .relay_state(connection, &id, game_state, UpdateKind::State)
                .await?;
        }
    }
    Ok(())
}
