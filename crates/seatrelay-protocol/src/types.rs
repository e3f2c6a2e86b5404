//! Core protocol types for the relay's wire format.
//!
//! Every frame is JSON. Clients send an array of action objects; the
//! server answers with single message objects. Both directions use an
//! `"action"` field as the discriminator:
//!
//! ```text
//! client → [{"action":"JOIN_GAME","id":"K7Q2","playerName":"Bob"}, ...]
//! server → {"action":"STATE_UPDATE","id":"K7Q2","playerIndex":1,...}
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::GameState;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The symbols a room code is drawn from.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Number of symbols in a room code.
pub const CODE_LEN: usize = 4;

/// The short, human-shareable identifier of a room, e.g. `"K7Q2"`.
///
/// Codes arriving from clients are not validated on decode: a malformed
/// code simply never matches a live room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps a code string without validating it.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code has the shape of an allocated code:
    /// exactly [`CODE_LEN`] symbols from [`CODE_ALPHABET`].
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == CODE_LEN
            && self.0.bytes().all(|b| CODE_ALPHABET.contains(&b))
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Options supplied with `CREATE_GAME`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    /// Move limit for the match; zero or negative means unlimited.
    #[serde(default, deserialize_with = "lenient_limit")]
    pub limit: i64,
    /// Display name of the creating (host) player.
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_name: String,
}

/// Decodes a field whose `null` means the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a move limit from whatever browsers send for it.
///
/// Fractions round up, numeric strings are parsed, and anything else
/// (`null`, `true`, `"abc"`) means unlimited.
fn lenient_limit<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let limit = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.ceil() as i64)),
        Some(Value::String(s)) => {
            s.trim().parse::<f64>().ok().map(|f| f.ceil() as i64)
        }
        _ => None,
    };
    Ok(limit.unwrap_or(0))
}

/// One request from a client.
///
/// Unknown `action` names fail to decode and are dropped by
/// [`ActionBatch`] rather than failing the whole frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientAction {
    /// Open a new room with the caller as host.
    CreateGame {
        #[serde(default, deserialize_with = "null_as_default")]
        options: CreateOptions,
    },

    /// Take the next free seat in a room.
    JoinGame {
        id: RoomCode,
        #[serde(default, deserialize_with = "null_as_default")]
        player_name: String,
    },

    /// Swap seat `pos` with seat `pos + 1`.
    MoveUp { id: RoomCode, pos: usize },

    /// Swap seat `pos` with seat `pos - 1`.
    MoveDown { id: RoomCode, pos: usize },

    /// Mark the caller ready.
    ReadyUp { id: RoomCode },

    /// Clear the caller's ready flag.
    ReadyDown { id: RoomCode },

    /// Start a match with the supplied initial state.
    StartGame {
        id: RoomCode,
        game_state: GameState,
        #[serde(default)]
        game_settings: Value,
    },

    /// Finish the match; `winner` is the winning seat index.
    EndGame { id: RoomCode, winner: usize },

    /// Replace the room's state after a move.
    BroadcastMove { id: RoomCode, game_state: GameState },

    /// Replace the room's state.
    Broadcast { id: RoomCode, game_state: GameState },
}

impl ClientAction {
    /// The wire name of this action, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateGame { .. } => "CREATE_GAME",
            Self::JoinGame { .. } => "JOIN_GAME",
            Self::MoveUp { .. } => "MOVE_UP",
            Self::MoveDown { .. } => "MOVE_DOWN",
            Self::ReadyUp { .. } => "READY_UP",
            Self::ReadyDown { .. } => "READY_DOWN",
            Self::StartGame { .. } => "START_GAME",
            Self::EndGame { .. } => "END_GAME",
            Self::BroadcastMove { .. } => "BROADCAST_MOVE",
            Self::Broadcast { .. } => "BROADCAST",
        }
    }
}

/// One inbound frame: an array of actions, applied in array order.
///
/// Entries that aren't recognizable actions are skipped and counted in
/// [`ignored`](Self::ignored). A frame that isn't a JSON array at all
/// fails to decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionBatch {
    actions: Vec<ClientAction>,
    ignored: usize,
}

impl ActionBatch {
    /// The recognized actions, in arrival order.
    pub fn actions(&self) -> &[ClientAction] {
        &self.actions
    }

    /// Number of entries that were dropped as unrecognized.
    pub fn ignored(&self) -> usize {
        self.ignored
    }
}

impl IntoIterator for ActionBatch {
    type Item = ClientAction;
    type IntoIter = std::vec::IntoIter<ClientAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

impl<'de> Deserialize<'de> for ActionBatch {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Known(ClientAction),
            Unknown(serde::de::IgnoredAny),
        }

        let entries = Vec::<Entry>::deserialize(d)?;
        let mut batch = ActionBatch::default();
        for entry in entries {
            match entry {
                Entry::Known(action) => batch.actions.push(action),
                Entry::Unknown(_) => batch.ignored += 1,
            }
        }
        Ok(batch)
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The public view of one seat, as shown to every member of the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub is_ready: bool,
    pub is_host: bool,
    pub wins: u32,
    pub name: String,
}

/// The full room snapshot pushed to each member.
///
/// All recipients of one broadcast receive the same snapshot; only
/// `player_index` differs, telling each client which seat is its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    pub game_state: GameState,
    pub id: RoomCode,
    pub player_index: usize,
    pub players: Vec<RosterEntry>,
}

/// Every message the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Acknowledgement, sent once right after the connection opens.
    Success { message: String },

    /// A recognized action was rejected (unknown room, not a member, ...).
    Failure { message: String },

    /// A join was rejected.
    JoinFailure { message: String },

    /// Room snapshot after a lobby change or a plain state broadcast.
    StateUpdate(StateUpdate),

    /// Room snapshot after an in-game move.
    StateUpdateMove(StateUpdate),

    /// The host started the match.
    Start { game_settings: Value },

    /// The room was torn down because its host left.
    Close,
}

impl ServerMessage {
    /// The connect acknowledgement.
    pub fn connected() -> Self {
        Self::Success {
            message: "Connected".to_owned(),
        }
    }

    /// The wire name of this message, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Success { .. } => "SUCCESS",
            Self::Failure { .. } => "FAILURE",
            Self::JoinFailure { .. } => "JOIN_FAILURE",
            Self::StateUpdate(_) => "STATE_UPDATE",
            Self::StateUpdateMove(_) => "STATE_UPDATE_MOVE",
            Self::Start { .. } => "START",
            Self::Close => "CLOSE",
        }
    }

    /// Returns the snapshot carried by either state-update variant.
    pub fn as_state_update(&self) -> Option<&StateUpdate> {
        match self {
            Self::StateUpdate(update) | Self::StateUpdateMove(update) => {
                Some(update)
            }
            _ => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
