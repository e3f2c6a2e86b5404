//! Fan-out of room snapshots and lifecycle announcements.
//!
//! Every push is a non-blocking send into a participant's outbox. A closed
//! outbox means that connection's task is already gone; its seat is
//! cleaned up by its own disconnect, so here it is only logged and skipped.

use seatrelay_protocol::{ServerMessage, StateUpdate};
use seatrelay_session::{Participant, Session};
use serde_json::Value;

/// Which state-update message a broadcast is sent as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateKind {
    /// `STATE_UPDATE`: lobby changes and plain state relays.
    #[default]
    State,
    /// `STATE_UPDATE_MOVE`: an in-game move.
    Move,
}

impl UpdateKind {
    fn wrap(self, update: StateUpdate) -> ServerMessage {
        match self {
            Self::State => ServerMessage::StateUpdate(update),
            Self::Move => ServerMessage::StateUpdateMove(update),
        }
    }
}

/// Pushes the session's current snapshot to every seat.
///
/// All recipients get the same game state and roster; `playerIndex` is
/// each recipient's own seat. Returns how many pushes were accepted.
pub fn publish(session: &Session, kind: UpdateKind) -> usize {
    let players = session.roster().entries();
    session
        .roster()
        .iter()
        .enumerate()
        .map(|(seat, participant)| {
            let update = StateUpdate {
                game_state: session.game_state().clone(),
                id: session.code().clone(),
                player_index: seat,
                players: players.clone(),
            };
            deliver(participant, kind.wrap(update))
        })
        .filter(|sent| *sent)
        .count()
}

/// Tells every seat the match has started.
pub fn announce_start(session: &Session, game_settings: &Value) -> usize {
    session
        .roster()
        .iter()
        .map(|participant| {
            deliver(
                participant,
                ServerMessage::Start {
                    game_settings: game_settings.clone(),
                },
            )
        })
        .filter(|sent| *sent)
        .count()
}

/// Tells the participants of a torn-down session that it is gone.
pub fn announce_close(participants: &[Participant]) -> usize {
    participants
        .iter()
        .map(|participant| deliver(participant, ServerMessage::Close))
        .filter(|sent| *sent)
        .count()
}

fn deliver(participant: &Participant, msg: ServerMessage) -> bool {
    let kind = msg.name();
    let sent = participant.send(msg);
    if !sent {
        tracing::debug!(
            connection = %participant.connection(),
            kind,
            "outbox closed, message dropped"
        );
    }
    sent
}
