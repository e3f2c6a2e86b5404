//! Room lifecycle control for Seatrelay.
//!
//! # Key types
//!
//! - [`Lobby`]: creates rooms, seats players, applies lobby and match
//!   actions, and handles disconnects
//! - [`UpdateKind`]: which snapshot message a relay is published as
//! - [`RoomSummary`]: read-only diagnostics for one live room
//!
//! Snapshots are pushed to each connection's outbox by the
//! [`broadcast`] module; nothing here touches a socket.

pub mod broadcast;
mod error;
mod lobby;

pub use broadcast::UpdateKind;
pub use error::LobbyError;
pub use lobby::{Lobby, RoomSummary};
