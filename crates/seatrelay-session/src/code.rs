//! Room code allocation.
//!
//! Codes are [`CODE_LEN`] symbols drawn uniformly from [`CODE_ALPHABET`],
//! giving 36^4 = 1,679,616 possible codes. A draw that collides with a
//! live room is thrown away and redrawn whole.

use rand::Rng;
use seatrelay_protocol::{CODE_ALPHABET, CODE_LEN, RoomCode};

use crate::SessionError;

/// Upper bound on redraws before allocation gives up.
///
/// With a few thousand live rooms the chance of even one collision per
/// draw is well under 1%, so hitting this bound means something is
/// broken, not busy.
pub const MAX_CODE_ATTEMPTS: usize = 4096;

/// Draws one random code. The result may collide with a live room.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..CODE_LEN)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    RoomCode::new(code)
}

/// Draws codes until one is not live, up to `max_attempts` draws.
///
/// # Errors
/// Returns [`SessionError::CodeSpaceExhausted`] when every draw collided.
pub fn allocate_code<R, F>(
    rng: &mut R,
    max_attempts: usize,
    is_live: F,
) -> Result<RoomCode, SessionError>
where
    R: Rng + ?Sized,
    F: Fn(&RoomCode) -> bool,
{
    for attempt in 1..=max_attempts {
        let code = generate_code(rng);
        if !is_live(&code) {
            if attempt > 1 {
                tracing::debug!(%code, attempt, "room code allocated after collision");
            }
            return Ok(code);
        }
    }

    tracing::error!(attempts = max_attempts, "room code space exhausted");
    Err(SessionError::CodeSpaceExhausted {
        attempts: max_attempts,
    })
}
