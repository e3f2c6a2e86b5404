//! A single room: its seats, status and opaque game state.
//!
//! `Session` is plain data plus the rules for mutating it. It does no
//! locking and no I/O; the lobby holds each session behind its own mutex
//! and fans out the resulting state after every mutation.

use seatrelay_protocol::{GameState, RoomCode};
use seatrelay_transport::ConnectionId;

use crate::{Participant, Roster, SessionError, SessionStatus};

/// The outcome of removing a participant from a session.
#[derive(Debug)]
pub struct Departure {
    /// The seat the participant held before removal.
    pub seat: usize,
    /// The removed participant.
    pub participant: Participant,
    /// Whether it held the host seat. A departing host ends the session.
    pub was_host: bool,
}

/// One live room.
#[derive(Debug)]
pub struct Session {
    code: RoomCode,
    status: SessionStatus,
    roster: Roster,
    game_state: GameState,
    closed: bool,
}

impl Session {
    /// Opens a room in the lobby with `host` in seat 0.
    pub fn new(code: RoomCode, host: Participant, limit: i64) -> Self {
        Self {
            code,
            status: SessionStatus::Lobby,
            roster: Roster::with_host(host),
            game_state: GameState::lobby(limit),
            closed: false,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    /// `true` once the session has been torn down. A handle obtained
    /// before teardown must treat a closed session as gone.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Checks that `connection` may act on this session and returns its
    /// seat.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the session was torn down,
    /// [`SessionError::NotMember`] if the connection holds no seat.
    pub fn ensure_member(
        &self,
        connection: ConnectionId,
    ) -> Result<usize, SessionError> {
        if self.closed {
            return Err(SessionError::NotFound(self.code.clone()));
        }
        self.roster
            .seat_of(connection)
            .ok_or_else(|| SessionError::NotMember(self.code.clone()))
    }

    /// Seats a new participant at the tail and returns its seat.
    ///
    /// Adds a matching placeholder to the game state's player slots and
    /// clears every ready flag.
    ///
    /// # Errors
    /// Rejects joins to a torn-down, running, or full session, and
    /// connections already seated here. Nothing is mutated on error.
    pub fn join(
        &mut self,
        participant: Participant,
    ) -> Result<usize, SessionError> {
        if self.closed {
            return Err(SessionError::NotFound(self.code.clone()));
        }
        if !self.status.is_joinable() {
            return Err(SessionError::InProgress(self.code.clone()));
        }
        if self.roster.is_full() {
            return Err(SessionError::RoomFull(self.code.clone()));
        }
        if self.roster.contains(participant.connection()) {
            return Err(SessionError::AlreadySeated(self.code.clone()));
        }

        let seat = self.roster.push(participant);
        self.game_state.push_player_slot();
        self.roster.unready_all();
        Ok(seat)
    }

    /// Swaps seat `pos` with the seat after it. Ready flags are cleared
    /// whether or not a swap happened. Returns `true` if seats moved.
    pub fn move_up(&mut self, pos: usize) -> bool {
        let moved = self.roster.move_up(pos);
        self.roster.unready_all();
        moved
    }

    /// Swaps seat `pos` with the seat before it. Ready flags are cleared
    /// whether or not a swap happened. Returns `true` if seats moved.
    pub fn move_down(&mut self, pos: usize) -> bool {
        let moved = self.roster.move_down(pos);
        self.roster.unready_all();
        moved
    }

    /// Sets `connection`'s ready flag.
    ///
    /// # Errors
    /// [`SessionError::NotMember`] if the connection holds no seat.
    pub fn set_ready(
        &mut self,
        connection: ConnectionId,
        ready: bool,
    ) -> Result<(), SessionError> {
        if self.roster.set_ready(connection, ready) {
            Ok(())
        } else {
            Err(SessionError::NotMember(self.code.clone()))
        }
    }

    /// Starts a match from the host-supplied initial state.
    pub fn start(&mut self, state: GameState) {
        self.status = SessionStatus::InProgress;
        self.game_state = state;
        self.game_state.set_status(self.status.wire_code());
    }

    /// Ends the match: credits the winner, returns to the lobby and clears
    /// every ready flag.
    ///
    /// # Errors
    /// [`SessionError::InvalidSeat`] if no one sits in `winner`; nothing
    /// is mutated.
    pub fn record_result(&mut self, winner: usize) -> Result<(), SessionError> {
        if !self.roster.record_win(winner) {
            return Err(SessionError::InvalidSeat(self.code.clone(), winner));
        }
        self.status = SessionStatus::Lobby;
        self.game_state.set_status(self.status.wire_code());
        self.roster.unready_all();
        Ok(())
    }

    /// Replaces the game state verbatim.
    pub fn replace_state(&mut self, state: GameState) {
        self.game_state = state;
    }

    /// Removes `connection`'s participant, compacting the seats behind it.
    ///
    /// For a non-host departure the departed seat's player slot is
    /// dropped and every ready flag cleared. A host departure leaves the
    /// rest untouched: the caller is expected to [`close`](Self::close)
    /// the session.
    pub fn depart(&mut self, connection: ConnectionId) -> Option<Departure> {
        let (seat, participant) = self.roster.remove(connection)?;
        let was_host = participant.is_host();
        if !was_host {
            self.game_state.remove_player_slot(seat);
            self.roster.unready_all();
        }
        Some(Departure {
            seat,
            participant,
            was_host,
        })
    }

    /// Marks the session torn down and hands back everyone still seated.
    pub fn close(&mut self) -> Vec<Participant> {
        self.closed = true;
        self.roster.drain()
    }
}
