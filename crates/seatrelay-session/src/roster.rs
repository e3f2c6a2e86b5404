//! The ordered seat list of a room.
//!
//! Seat order is turn order. Seat 0 is the host seat, and the `is_host`
//! flag is recomputed from position after every change that can move
//! someone into or out of seat 0, so exactly one participant is ever
//! flagged host.

use seatrelay_protocol::RosterEntry;
use seatrelay_transport::ConnectionId;

use crate::Participant;

/// Maximum number of seats in a room.
pub const MAX_SEATS: usize = 4;

/// Ordered list of the participants seated in one room.
#[derive(Debug)]
pub struct Roster {
    seats: Vec<Participant>,
}

impl Roster {
    /// A roster whose only seat is taken by `host`.
    pub fn with_host(host: Participant) -> Self {
        let mut roster = Self {
            seats: Vec::with_capacity(MAX_SEATS),
        };
        roster.seats.push(host);
        roster.refresh_host();
        roster
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.seats.len() >= MAX_SEATS
    }

    /// Participants in seat order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.seats.iter()
    }

    pub fn get(&self, seat: usize) -> Option<&Participant> {
        self.seats.get(seat)
    }

    /// The seat-0 occupant.
    pub fn host(&self) -> Option<&Participant> {
        self.seats.first()
    }

    /// The seat held by `connection`, if any.
    pub fn seat_of(&self, connection: ConnectionId) -> Option<usize> {
        self.seats
            .iter()
            .position(|p| p.connection() == connection)
    }

    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.seat_of(connection).is_some()
    }

    /// Seats `participant` at the tail and returns its seat index.
    ///
    /// Capacity is the caller's check; see [`is_full`](Self::is_full).
    pub(crate) fn push(&mut self, mut participant: Participant) -> usize {
        debug_assert!(!self.is_full(), "push onto a full roster");
        participant.is_host = false;
        participant.is_ready = false;
        self.seats.push(participant);
        self.refresh_host();
        self.seats.len() - 1
    }

    /// Swaps seat `pos` with `pos + 1`. Returns `false` (and changes
    /// nothing) when `pos` is the last seat or beyond.
    pub(crate) fn move_up(&mut self, pos: usize) -> bool {
        if pos + 1 >= self.seats.len() {
            return false;
        }
        self.seats.swap(pos, pos + 1);
        self.refresh_host();
        true
    }

    /// Swaps seat `pos` with `pos - 1`. Returns `false` (and changes
    /// nothing) when `pos` is the first seat or beyond the last.
    pub(crate) fn move_down(&mut self, pos: usize) -> bool {
        if pos == 0 || pos >= self.seats.len() {
            return false;
        }
        self.seats.swap(pos, pos - 1);
        self.refresh_host();
        true
    }

    /// Sets the ready flag of `connection`'s seat. Returns `false` if the
    /// connection holds no seat.
    pub(crate) fn set_ready(
        &mut self,
        connection: ConnectionId,
        ready: bool,
    ) -> bool {
        match self.seats.iter_mut().find(|p| p.connection() == connection) {
            Some(p) => {
                p.is_ready = ready;
                true
            }
            None => false,
        }
    }

    pub(crate) fn unready_all(&mut self) {
        for p in &mut self.seats {
            p.is_ready = false;
        }
    }

    /// Adds a win to the occupant of `seat`. Returns `false` if the seat
    /// is empty.
    pub(crate) fn record_win(&mut self, seat: usize) -> bool {
        match self.seats.get_mut(seat) {
            Some(p) => {
                p.wins += 1;
                true
            }
            None => false,
        }
    }

    /// Removes `connection`'s seat, shifting every later seat down by one.
    ///
    /// Returns the vacated seat index and the removed participant, whose
    /// `is_host` flag still reflects whether it held seat 0.
    pub(crate) fn remove(
        &mut self,
        connection: ConnectionId,
    ) -> Option<(usize, Participant)> {
        let seat = self.seat_of(connection)?;
        let removed = self.seats.remove(seat);
        self.refresh_host();
        Some((seat, removed))
    }

    /// Empties the roster, returning everyone in seat order.
    pub(crate) fn drain(&mut self) -> Vec<Participant> {
        std::mem::take(&mut self.seats)
    }

    /// Roster projection for every seat, in order.
    pub fn entries(&self) -> Vec<RosterEntry> {
        self.seats.iter().map(Participant::roster_entry).collect()
    }

    fn refresh_host(&mut self) {
        for (seat, p) in self.seats.iter_mut().enumerate() {
            p.is_host = seat == 0;
        }
    }
}
