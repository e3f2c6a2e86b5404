//! # Seatrelay
//!
//! Ephemeral multiplayer game rooms over WebSockets.
//!
//! Clients create or join a room by its 4-character code, arrange seats
//! and readiness in the lobby, then exchange an opaque game-state payload
//! that the server stores and republishes to every seat without looking
//! inside it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seatrelay::prelude::*;
//!
//! # async fn run() -> Result<(), RelayError> {
//! let server = RelayServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
pub mod dispatch;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::RelayError;
pub use server::{RelayServer, RelayServerBuilder};

pub mod prelude {
    pub use crate::{RelayError, RelayServer, RelayServerBuilder, ServerConfig};
    pub use seatrelay_lobby::{Lobby, LobbyError, RoomSummary, UpdateKind};
    pub use seatrelay_protocol::{
        ActionBatch, ClientAction, Codec, CreateOptions, GameState, JsonCodec,
        RoomCode, RosterEntry, ServerMessage, StateUpdate,
    };
    pub use seatrelay_session::{MAX_SEATS, SessionError, SessionStatus};
}
