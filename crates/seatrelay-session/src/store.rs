//! The session store: every live room plus a seat index.
//!
//! # Concurrency note
//!
//! `SessionStore` is NOT thread-safe by itself. The lobby owns it behind a
//! single mutex and holds that lock only long enough to resolve codes and
//! seats. Each session sits behind its own [`SharedSession`] mutex so that
//! work on one room never waits on another. Lock order is always store
//! first, then session.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use seatrelay_protocol::RoomCode;
use seatrelay_transport::ConnectionId;
use tokio::sync::Mutex;

use crate::{MAX_CODE_ATTEMPTS, Participant, Session, SessionError, allocate_code};

/// A session handle shared between the store and in-flight operations.
pub type SharedSession = Arc<Mutex<Session>>;

/// Registry of live sessions, keyed by room code.
///
/// Alongside the sessions it keeps an index from connection to the room
/// that connection is seated in. A connection holds at most one seat.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<RoomCode, SharedSession>,
    seats: HashMap<ConnectionId, RoomCode>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session under a fresh code with `host` in seat 0.
    ///
    /// # Errors
    /// - [`SessionError::AlreadySeated`] if the host's connection is
    ///   already seated somewhere.
    /// - [`SessionError::CodeSpaceExhausted`] if no free code was found.
    pub fn create<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        host: Participant,
        limit: i64,
    ) -> Result<(RoomCode, SharedSession), SessionError> {
        let connection = host.connection();
        if let Some(code) = self.seats.get(&connection) {
            return Err(SessionError::AlreadySeated(code.clone()));
        }

        let code = allocate_code(rng, MAX_CODE_ATTEMPTS, |candidate| {
            self.sessions.contains_key(candidate)
        })?;
        let session = Arc::new(Mutex::new(Session::new(code.clone(), host, limit)));

        self.sessions.insert(code.clone(), Arc::clone(&session));
        self.seats.insert(connection, code.clone());
        tracing::debug!(%code, %connection, "session registered");

        Ok((code, session))
    }

    /// [`create`](Self::create) with the thread-local RNG.
    pub fn open(
        &mut self,
        host: Participant,
        limit: i64,
    ) -> Result<(RoomCode, SharedSession), SessionError> {
        self.create(&mut rand::rng(), host, limit)
    }

    /// Looks up a live session.
    pub fn get(&self, code: &RoomCode) -> Option<SharedSession> {
        self.sessions.get(code).cloned()
    }

    /// Looks up a live session, failing with [`SessionError::NotFound`].
    pub fn resolve(&self, code: &RoomCode) -> Result<SharedSession, SessionError> {
        self.get(code)
            .ok_or_else(|| SessionError::NotFound(code.clone()))
    }

    /// Unregisters a session and releases every seat pointing at it.
    pub fn remove(&mut self, code: &RoomCode) -> Option<SharedSession> {
        let session = self.sessions.remove(code)?;
        self.seats.retain(|_, seated_in| seated_in != code);
        tracing::debug!(%code, "session unregistered");
        Some(session)
    }

    /// The room `connection` is seated in, if any.
    pub fn seat_room(&self, connection: ConnectionId) -> Option<&RoomCode> {
        self.seats.get(&connection)
    }

    /// Records that `connection` now holds a seat in `code`.
    pub fn assign_seat(&mut self, connection: ConnectionId, code: RoomCode) {
        self.seats.insert(connection, code);
    }

    /// Forgets `connection`'s seat, returning the room it was in.
    pub fn release_seat(&mut self, connection: ConnectionId) -> Option<RoomCode> {
        self.seats.remove(&connection)
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.sessions.contains_key(code)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of seated connections across all sessions.
    pub fn seated(&self) -> usize {
        self.seats.len()
    }

    /// Handles to every live session, in no particular order.
    pub fn sessions(&self) -> impl Iterator<Item = (&RoomCode, &SharedSession)> {
        self.sessions.iter()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::mpsc;

    use super::*;

    fn participant(id: u64) -> Participant {
        Participant::new(
            ConnectionId::new(id),
            mpsc::unbounded_channel().0,
            format!("p{id}"),
        )
    }

    #[test]
    fn test_create_registers_session_and_host_seat() {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(7);

        let (code, session) = store.create(&mut rng, participant(1), 0).unwrap();

        assert!(code.is_well_formed());
        assert!(store.contains(&code));
        assert_eq!(store.len(), 1);
        assert_eq!(store.seat_room(ConnectionId::new(1)), Some(&code));
        assert_eq!(session.blocking_lock().code(), &code);
    }

    #[test]
    fn test_create_produces_distinct_codes() {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(11);

        for id in 0..200 {
            store.create(&mut rng, participant(id), 0).unwrap();
        }

        assert_eq!(store.len(), 200);
        assert_eq!(store.seated(), 200);
    }

    #[test]
    fn test_create_while_seated_rejected() {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let (code, _) = store.create(&mut rng, participant(1), 0).unwrap();

        let result = store.create(&mut rng, participant(1), 0);

        assert_eq!(result.map(|(c, _)| c), Err(SessionError::AlreadySeated(code)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_code_is_not_found() {
        let store = SessionStore::new();
        let code = RoomCode::new("ZZZZ");
        assert!(store.get(&code).is_none());
        assert!(matches!(
            store.resolve(&code),
            Err(SessionError::NotFound(c)) if c == code
        ));
    }

    #[test]
    fn test_remove_releases_all_seats_in_room() {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(5);
        let (code, _) = store.create(&mut rng, participant(1), 0).unwrap();
        let (other, _) = store.create(&mut rng, participant(9), 0).unwrap();
        store.assign_seat(ConnectionId::new(2), code.clone());
        store.assign_seat(ConnectionId::new(3), code.clone());

        assert!(store.remove(&code).is_some());

        assert!(!store.contains(&code));
        assert!(store.seat_room(ConnectionId::new(1)).is_none());
        assert!(store.seat_room(ConnectionId::new(2)).is_none());
        assert!(store.seat_room(ConnectionId::new(3)).is_none());
        assert_eq!(store.seat_room(ConnectionId::new(9)), Some(&other));
        assert!(store.remove(&code).is_none());
    }

    #[test]
    fn test_release_seat_returns_room() {
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        let (code, _) = store.create(&mut rng, participant(1), 0).unwrap();

        assert_eq!(store.release_seat(ConnectionId::new(1)), Some(code));
        assert_eq!(store.release_seat(ConnectionId::new(1)), None);
        assert_eq!(store.len(), 1);
    }
}
