//! Room sessions for Seatrelay.
//!
//! This crate holds the data model of the relay and the rules that guard
//! it:
//!
//! 1. **Room codes**: random 4-symbol codes, redrawn on collision
//!    ([`allocate_code`])
//! 2. **Seats**: an ordered roster of at most [`MAX_SEATS`] participants
//!    where seat 0 is always the host ([`Roster`])
//! 3. **Sessions**: one room's roster, status and opaque game state
//!    ([`Session`])
//! 4. **Store**: every live session plus a connection-to-room seat index
//!    ([`SessionStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby Layer (above)  ← locks the store and sessions, fans out updates
//!     ↕
//! Session Layer (this crate)  ← pure state and validation, no I/O
//!     ↕
//! Protocol Layer (below)  ← RoomCode, GameState, ServerMessage
//! ```

mod code;
mod error;
mod participant;
mod roster;
mod session;
mod status;
mod store;

pub use code::{MAX_CODE_ATTEMPTS, allocate_code, generate_code};
pub use error::SessionError;
pub use participant::{Outbox, Participant};
pub use roster::{MAX_SEATS, Roster};
pub use session::{Departure, Session};
pub use status::SessionStatus;
pub use store::{SessionStore, SharedSession};
