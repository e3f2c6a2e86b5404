//! Wire protocol for Seatrelay.
//!
//! - **Types** ([`ClientAction`], [`ServerMessage`], [`StateUpdate`], ...):
//!   the message structures that travel on the wire.
//! - **State** ([`GameState`]): the opaque game payload the relay stores
//!   and republishes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   frame text and back.
//!
//! ```text
//! Transport (frames) → Protocol (ActionBatch / ServerMessage) → Lobby
//! ```

mod codec;
mod error;
mod state;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use state::{GameState, STATUS_IN_PROGRESS, STATUS_LOBBY};
pub use types::{
    ActionBatch, CODE_ALPHABET, CODE_LEN, ClientAction, CreateOptions,
    RoomCode, RosterEntry, ServerMessage, StateUpdate,
};
