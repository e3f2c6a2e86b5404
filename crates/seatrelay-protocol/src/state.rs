//! The opaque game-state payload.
//!
//! The relay never interprets game state. It stores whatever the clients'
//! game logic produced and republishes it verbatim. The only parts it
//! touches are the `players` slot list, which it keeps one entry per seat,
//! and the numeric `status` field, which it flips on start/end so clients
//! reading the payload see the same lobby/in-game phase as the room.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// `status` value written into the payload while the room is in its lobby.
pub const STATUS_LOBBY: u8 = 0;

/// `status` value written into the payload once a match starts.
pub const STATUS_IN_PROGRESS: u8 = 1;

/// An opaque game-state blob.
///
/// Serializes as the inner JSON value itself (`#[serde(transparent)]`), so
/// `{"gameState": {...}}` on the wire maps straight onto this type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameState(Value);

impl GameState {
    /// Wraps an arbitrary JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The state a freshly created room starts with: an empty board, one
    /// player slot for the host, and the optional move limit.
    ///
    /// A `limit` of zero or below means "unlimited".
    pub fn lobby(limit: i64) -> Self {
        let limited = limit > 0;
        let move_limit = if limited { limit } else { 0 };
        Self(json!({
            "map": {},
            "turn": 0,
            "placements": [],
            "moveLimit": move_limit,
            "isLimited": limited,
            "status": STATUS_LOBBY,
            "players": [null],
        }))
    }

    /// Borrows the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Number of entries in the `players` slot list, or `None` when the
    /// payload carries no such list.
    pub fn player_slots(&self) -> Option<usize> {
        self.0.get("players").and_then(Value::as_array).map(Vec::len)
    }

    /// Appends a `null` placeholder slot for a newly seated player.
    pub fn push_player_slot(&mut self) {
        if let Some(slots) = self.slots_mut() {
            slots.push(Value::Null);
        }
    }

    /// Removes the slot of a departed seat.
    ///
    /// Falls back to the last slot when `seat` is past the end, so the
    /// list still shrinks by exactly one.
    pub fn remove_player_slot(&mut self, seat: usize) {
        if let Some(slots) = self.slots_mut() {
            if seat < slots.len() {
                slots.remove(seat);
            } else {
                slots.pop();
            }
        }
    }

    /// Overwrites the payload's numeric `status` field, if the payload is
    /// an object.
    pub fn set_status(&mut self, status: u8) {
        if let Some(obj) = self.0.as_object_mut() {
            obj.insert("status".to_owned(), Value::from(status));
        }
    }

    fn slots_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.0.get_mut("players").and_then(Value::as_array_mut)
    }
}

impl From<Value> for GameState {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
