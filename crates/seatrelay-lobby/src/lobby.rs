//! The lobby: every room operation a client can request.
//!
//! The lobby owns the [`SessionStore`] behind one mutex. Operations that
//! change who sits where (create, join, disconnect) hold that lock for
//! their whole critical section. Everything else resolves the room, lets
//! go of the store, and works under the room's own lock, so rooms never
//! wait on each other.
//!
//! Every successful mutation ends with a fan-out of the room's new
//! snapshot. Rejections mutate nothing and publish nothing.

use seatrelay_protocol::{CreateOptions, GameState, RoomCode, RosterEntry};
use seatrelay_session::{
    MAX_SEATS, Outbox, Participant, Session, SessionError, SessionStatus,
    SessionStore, SharedSession,
};
use seatrelay_transport::ConnectionId;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::LobbyError;
use crate::broadcast::{self, UpdateKind};

/// Read-only summary of one live room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub code: RoomCode,
    pub occupancy: usize,
    pub capacity: usize,
    pub status: SessionStatus,
}

/// Lifecycle controller for all rooms.
///
/// Shared across connection tasks behind an `Arc`.
#[derive(Debug, Default)]
pub struct Lobby {
    store: Mutex<SessionStore>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a room with the caller as host in seat 0 and sends it the
    /// first snapshot.
    ///
    /// A caller already seated elsewhere leaves that seat first, exactly
    /// as if it had disconnected.
    ///
    /// # Errors
    /// [`SessionError::CodeSpaceExhausted`] if no free code was found.
    pub async fn create_session(
        &self,
        connection: ConnectionId,
        outbox: Outbox,
        options: CreateOptions,
    ) -> Result<RoomCode, LobbyError> {
        let mut store = self.store.lock().await;
        if store.seat_room(connection).is_some() {
            depart(&mut store, connection).await;
        }

        let host = Participant::new(connection, outbox, options.player_name);
        let (code, shared) = store.open(host, options.limit)?;
        let session = shared.lock().await;
        broadcast::publish(&session, UpdateKind::State);

        tracing::info!(
            %code,
            %connection,
            limit = options.limit,
            rooms = store.len(),
            "game created"
        );
        Ok(code)
    }

    /// Seats the caller at the tail of room `code` and publishes.
    ///
    /// Returns the caller's seat.
    ///
    /// # Errors
    /// [`LobbyError::Join`] if the room is missing, running or full, or
    /// the caller already holds a seat anywhere.
    pub async fn join_session(
        &self,
        connection: ConnectionId,
        outbox: Outbox,
        code: &RoomCode,
        player_name: String,
    ) -> Result<usize, LobbyError> {
        let refuse = |source| LobbyError::Join {
            code: code.clone(),
            source,
        };

        let mut store = self.store.lock().await;
        if let Some(current) = store.seat_room(connection) {
            return Err(refuse(SessionError::AlreadySeated(current.clone())));
        }
        let shared = store.resolve(code).map_err(refuse)?;
        let mut session = shared.lock().await;

        let seat = session
            .join(Participant::new(connection, outbox, player_name))
            .map_err(refuse)?;
        store.assign_seat(connection, code.clone());
        drop(store);

        broadcast::publish(&session, UpdateKind::State);
        tracing::info!(
            %code,
            %connection,
            seat,
            players = session.roster().len(),
            "player joined"
        );
        Ok(seat)
    }

    /// Swaps seat `pos` with the seat after it.
    pub async fn move_up(
        &self,
        connection: ConnectionId,
        code: &RoomCode,
        pos: usize,
    ) -> Result<(), LobbyError> {
        self.act(connection, code, UpdateKind::State, |session| {
            session.move_up(pos);
            Ok(())
        })
        .await
    }

    /// Swaps seat `pos` with the seat before it.
    pub async fn move_down(
        &self,
        connection: ConnectionId,
        code: &RoomCode,
        pos: usize,
    ) -> Result<(), LobbyError> {
        self.act(connection, code, UpdateKind::State, |session| {
            session.move_down(pos);
            Ok(())
        })
        .await
    }

    /// Sets the caller's own ready flag.
    pub async fn set_ready(
        &self,
        connection: ConnectionId,
        code: &RoomCode,
        ready: bool,
    ) -> Result<(), LobbyError> {
        self.act(connection, code, UpdateKind::State, |session| {
            session.set_ready(connection, ready)
        })
        .await
    }

    /// Starts the match: sends `START` with `game_settings` to every seat,
    /// then the new snapshot.
    pub async fn start_game(
        &self,
        connection: ConnectionId,
        code: &RoomCode,
        game_state: GameState,
        game_settings: Value,
    ) -> Result<(), LobbyError> {
        let shared = self.resolve(code).await?;
        let mut session = shared.lock().await;
        session.ensure_member(connection)?;

        session.start(game_state);
        broadcast::announce_start(&session, &game_settings);
        broadcast::publish(&session, UpdateKind::State);

        tracing::info!(%code, %connection, players = session.roster().len(), "game started");
        Ok(())
    }

    /// Ends the match, crediting seat `winner`.
    pub async fn end_game(
        &self,
        connection: ConnectionId,
        code: &RoomCode,
        winner: usize,
    ) -> Result<(), LobbyError> {
        self.act(connection, code, UpdateKind::State, |session| {
            session.record_result(winner)
        })
        .await?;
        tracing::info!(%code, winner, "game ended");
        Ok(())
    }

    /// Replaces the room's game state verbatim and republishes it.
    pub async fn relay_state(
        &self,
        connection: ConnectionId,
        code: &RoomCode,
        game_state: GameState,
        kind: UpdateKind,
    ) -> Result<(), LobbyError> {
        self.act(connection, code, kind, |session| {
            session.replace_state(game_state);
            Ok(())
        })
        .await
    }

    /// Handles a closed connection.
    ///
    /// A departing host tears the room down and every remaining seat gets
    /// `CLOSE`. Anyone else is removed and the room republished. Returns
    /// the room the connection was seated in, if any.
    pub async fn disconnect(&self, connection: ConnectionId) -> Option<RoomCode> {
        let mut store = self.store.lock().await;
        depart(&mut store, connection).await
    }

    /// The room `connection` is seated in, if any.
    pub async fn seat_room(&self, connection: ConnectionId) -> Option<RoomCode> {
        self.store.lock().await.seat_room(connection).cloned()
    }

    /// Current game state of a live room.
    pub async fn game_state(&self, code: &RoomCode) -> Option<GameState> {
        self.read(code, |session| session.game_state().clone()).await
    }

    /// Current roster projection of a live room, in seat order.
    pub async fn roster(&self, code: &RoomCode) -> Option<Vec<RosterEntry>> {
        self.read(code, |session| session.roster().entries()).await
    }

    /// Current status of a live room.
    pub async fn status(&self, code: &RoomCode) -> Option<SessionStatus> {
        self.read(code, Session::status).await
    }

    /// One summary per live room, ordered by code.
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let handles: Vec<SharedSession> = {
            let store = self.store.lock().await;
            store.sessions().map(|(_, shared)| shared.clone()).collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for shared in handles {
            let session = shared.lock().await;
            if session.is_closed() {
                continue;
            }
            summaries.push(RoomSummary {
                code: session.code().clone(),
                occupancy: session.roster().len(),
                capacity: MAX_SEATS,
                status: session.status(),
            });
        }
        summaries.sort_by(|a, b| a.code.cmp(&b.code));
        summaries
    }

    /// Number of live rooms.
    pub async fn session_count(&self) -> usize {
        self.store.lock().await.len()
    }

    async fn resolve(&self, code: &RoomCode) -> Result<SharedSession, SessionError> {
        self.store.lock().await.resolve(code)
    }

    /// Runs a member-only mutation under the room's lock and publishes the
    /// result as `kind`.
    async fn act<T>(
        &self,
        connection: ConnectionId,
        code: &RoomCode,
        kind: UpdateKind,
        mutate: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, LobbyError> {
        let shared = self.resolve(code).await?;
        act_on(&shared, connection, kind, mutate).await
    }

    async fn read<T>(
        &self,
        code: &RoomCode,
        view: impl FnOnce(&Session) -> T,
    ) -> Option<T> {
        let shared = self.store.lock().await.get(code)?;
        let session = shared.lock().await;
        (!session.is_closed()).then(|| view(&*session))
    }
}

/// Applies `mutate` to an already resolved room.
///
/// The handle may have been torn down since it was resolved; a closed
/// room answers `NotFound` and publishes nothing.
async fn act_on<T>(
    shared: &SharedSession,
    connection: ConnectionId,
    kind: UpdateKind,
    mutate: impl FnOnce(&mut Session) -> Result<T, SessionError>,
) -> Result<T, LobbyError> {
    let mut session = shared.lock().await;
    session.ensure_member(connection)?;

    let out = mutate(&mut *session)?;
    broadcast::publish(&session, kind);
    Ok(out)
}

/// Removes `connection` from whatever room it sits in. Caller holds the
/// store lock.
async fn depart(store: &mut SessionStore, connection: ConnectionId) -> Option<RoomCode> {
    let code = store.release_seat(connection)?;
    let shared = store.get(&code)?;
    let mut session = shared.lock().await;
    let departure = session.depart(connection)?;

    if departure.was_host {
        let remaining = session.close();
        store.remove(&code);
        broadcast::announce_close(&remaining);
        tracing::info!(
            %code,
            %connection,
            closed = remaining.len(),
            rooms = store.len(),
            "host left, game closed"
        );
    } else {
        broadcast::publish(&session, UpdateKind::State);
        tracing::info!(
            %code,
            %connection,
            seat = departure.seat,
            players = session.roster().len(),
            in_game = session.status().is_active(),
            "player left"
        );
    }
    Some(code)
}
