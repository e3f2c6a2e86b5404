//! Integration tests for the lobby: room lifecycle, seat management and
//! fan-out, observed through each connection's outbox.

use std::sync::Arc;

use seatrelay_lobby::{Lobby, LobbyError, UpdateKind};
use seatrelay_protocol::{
    CreateOptions, GameState, RoomCode, ServerMessage, StateUpdate,
};
use seatrelay_session::{MAX_SEATS, Outbox, SessionError, SessionStatus};
use seatrelay_transport::ConnectionId;
use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedReceiver};

// =========================================================================
// Helpers
// =========================================================================

/// One simulated connection: its id, outbox and the receiving end.
struct Client {
    id: ConnectionId,
    outbox: Outbox,
    rx: UnboundedReceiver<ServerMessage>,
}

impl Client {
    fn new(id: u64) -> Self {
        let (outbox, rx) = mpsc::unbounded_channel();
        Self {
            id: ConnectionId::new(id),
            outbox,
            rx,
        }
    }

    /// Everything pushed so far, in order.
    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// The single snapshot pushed since the last drain.
    fn last_update(&mut self) -> StateUpdate {
        let messages = self.drain();
        assert_eq!(messages.len(), 1, "expected one message, got {messages:?}");
        messages[0]
            .as_state_update()
            .cloned()
            .expect("expected a state update")
    }
}

fn options(name: &str) -> CreateOptions {
    CreateOptions {
        limit: 0,
        player_name: name.to_owned(),
    }
}

async fn create(lobby: &Lobby, host: &Client, name: &str) -> RoomCode {
    lobby
        .create_session(host.id, host.outbox.clone(), options(name))
        .await
        .unwrap()
}

async fn join(lobby: &Lobby, client: &Client, code: &RoomCode, name: &str) {
    lobby
        .join_session(client.id, client.outbox.clone(), code, name.to_owned())
        .await
        .unwrap();
}

/// A lobby with one room holding `names.len()` players, outboxes drained.
async fn room_of(names: &[&str]) -> (Lobby, RoomCode, Vec<Client>) {
    let lobby = Lobby::new();
    let mut clients: Vec<Client> =
        (1..=names.len() as u64).map(Client::new).collect();
    let code = create(&lobby, &clients[0], names[0]).await;
    for (client, name) in clients.iter().zip(names).skip(1) {
        join(&lobby, client, &code, name).await;
    }
    for client in &mut clients {
        client.drain();
    }
    (lobby, code, clients)
}

async fn names(lobby: &Lobby, code: &RoomCode) -> Vec<String> {
    lobby
        .roster(code)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}

async fn ready_flags(lobby: &Lobby, code: &RoomCode) -> Vec<bool> {
    lobby
        .roster(code)
        .await
        .unwrap()
        .iter()
        .map(|entry| entry.is_ready)
        .collect()
}

// =========================================================================
// Create / join
// =========================================================================

#[tokio::test]
async fn test_create_makes_single_host_in_lobby() {
    let lobby = Lobby::new();
    let mut alice = Client::new(1);

    let code = create(&lobby, &alice, "Alice").await;

    assert!(code.is_well_formed());
    let update = alice.last_update();
    assert_eq!(update.id, code);
    assert_eq!(update.player_index, 0);
    assert_eq!(update.players.len(), 1);
    assert_eq!(update.players[0].name, "Alice");
    assert!(update.players[0].is_host);
    assert!(!update.players[0].is_ready);
    assert_eq!(update.players[0].wins, 0);
    assert_eq!(
        update.game_state.as_value(),
        &json!({
            "map": {},
            "turn": 0,
            "placements": [],
            "moveLimit": 0,
            "isLimited": false,
            "status": 0,
            "players": [null],
        })
    );
    assert_eq!(lobby.status(&code).await, Some(SessionStatus::Lobby));
    assert_eq!(lobby.session_count().await, 1);
}

#[tokio::test]
async fn test_create_with_move_limit() {
    let lobby = Lobby::new();
    let mut alice = Client::new(1);

    lobby
        .create_session(
            alice.id,
            alice.outbox.clone(),
            CreateOptions {
                limit: 30,
                player_name: "Alice".into(),
            },
        )
        .await
        .unwrap();

    let state = alice.last_update().game_state;
    assert_eq!(state.as_value()["moveLimit"], 30);
    assert_eq!(state.as_value()["isLimited"], true);
}

#[tokio::test]
async fn test_join_adds_non_host_and_publishes_to_all() {
    let (lobby, code, mut clients) = room_of(&["Alice"]).await;
    lobby.set_ready(clients[0].id, &code, true).await.unwrap();
    clients[0].drain();
    let bob = Client::new(2);

    let seat = lobby
        .join_session(bob.id, bob.outbox.clone(), &code, "Bob".into())
        .await
        .unwrap();
    clients.push(bob);

    assert_eq!(seat, 1);
    let host_view = clients[0].last_update();
    let bob_view = clients[1].last_update();
    assert_eq!(host_view.player_index, 0);
    assert_eq!(bob_view.player_index, 1);
    assert_eq!(bob_view.players.len(), 2);
    assert_eq!(bob_view.players[1].name, "Bob");
    assert!(!bob_view.players[1].is_host);
    assert!(!bob_view.players[1].is_ready);
    assert!(!bob_view.players[0].is_ready, "join clears every ready flag");
    assert_eq!(bob_view.game_state.player_slots(), Some(2));
    assert_eq!(lobby.seat_room(clients[1].id).await, Some(code));
}

#[tokio::test]
async fn test_join_full_room_is_refused_without_mutation() {
    let (lobby, code, mut clients) = room_of(&["a", "b", "c", "d"]).await;
    let late = Client::new(5);

    let err = lobby
        .join_session(late.id, late.outbox.clone(), &code, "late".into())
        .await
        .unwrap_err();

    assert!(err.is_join_failure());
    assert_eq!(err.reason(), &SessionError::RoomFull(code.clone()));
    assert_eq!(names(&lobby, &code).await, ["a", "b", "c", "d"]);
    for client in &mut clients {
        assert!(client.drain().is_empty(), "refused join must not publish");
    }
    assert_eq!(lobby.seat_room(late.id).await, None);
}

#[tokio::test]
async fn test_join_running_game_is_refused() {
    let (lobby, code, clients) = room_of(&["a", "b"]).await;
    lobby
        .start_game(clients[0].id, &code, GameState::lobby(0), json!({}))
        .await
        .unwrap();
    let late = Client::new(3);

    let err = lobby
        .join_session(late.id, late.outbox.clone(), &code, "late".into())
        .await
        .unwrap_err();

    assert_eq!(err.reason(), &SessionError::InProgress(code.clone()));
    assert_eq!(names(&lobby, &code).await.len(), 2);
}

#[tokio::test]
async fn test_join_unknown_room_is_refused() {
    let lobby = Lobby::new();
    let bob = Client::new(1);
    let code = RoomCode::new("ZZZZ");

    let err = lobby
        .join_session(bob.id, bob.outbox.clone(), &code, "Bob".into())
        .await
        .unwrap_err();

    assert!(err.is_join_failure());
    assert_eq!(
        err.to_string(),
        "Cannot join game 'ZZZZ': Game 'ZZZZ' does not exist"
    );
}

#[tokio::test]
async fn test_join_while_seated_is_refused() {
    let lobby = Lobby::new();
    let alice = Client::new(1);
    let bob = Client::new(2);
    let first = create(&lobby, &alice, "Alice").await;
    let second = create(&lobby, &bob, "Bob").await;

    let err = lobby
        .join_session(bob.id, bob.outbox.clone(), &first, "Bob".into())
        .await
        .unwrap_err();

    assert_eq!(err.reason(), &SessionError::AlreadySeated(second));
    assert_eq!(names(&lobby, &first).await, ["Alice"]);
}

#[tokio::test]
async fn test_create_while_seated_leaves_old_room_first() {
    let (lobby, old, mut clients) = room_of(&["Alice", "Bob", "Cara"]).await;

    let new = create(&lobby, &clients[1], "Bob").await;

    assert_ne!(old, new);
    assert_eq!(names(&lobby, &old).await, ["Alice", "Cara"]);
    assert_eq!(names(&lobby, &new).await, ["Bob"]);
    assert_eq!(lobby.seat_room(clients[1].id).await, Some(new));
    assert_eq!(clients[0].last_update().players.len(), 2);
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_codes() {
    let lobby = Arc::new(Lobby::new());

    let tasks: Vec<_> = (0..64)
        .map(|id| {
            let lobby = Arc::clone(&lobby);
            tokio::spawn(async move {
                let client = Client::new(id);
                lobby
                    .create_session(client.id, client.outbox.clone(), options("p"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut codes = Vec::new();
    for task in tasks {
        codes.push(task.await.unwrap());
    }
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 64);
    assert_eq!(lobby.session_count().await, 64);
}

// =========================================================================
// Guard
// =========================================================================

#[tokio::test]
async fn test_action_on_unknown_room_is_not_found() {
    let lobby = Lobby::new();
    let code = RoomCode::new("QQQQ");

    let err = lobby
        .set_ready(ConnectionId::new(1), &code, true)
        .await
        .unwrap_err();

    assert_eq!(err, LobbyError::Session(SessionError::NotFound(code)));
}

#[tokio::test]
async fn test_action_by_non_member_is_rejected_without_publish() {
    let (lobby, code, mut clients) = room_of(&["Alice", "Bob"]).await;
    let stranger = ConnectionId::new(99);

    let err = lobby.move_up(stranger, &code, 0).await.unwrap_err();

    assert_eq!(err, LobbyError::Session(SessionError::NotMember(code.clone())));
    assert_eq!(names(&lobby, &code).await, ["Alice", "Bob"]);
    for client in &mut clients {
        assert!(client.drain().is_empty());
    }
}

// =========================================================================
// Seats and readiness
// =========================================================================

#[tokio::test]
async fn test_move_up_last_index_clears_ready_and_still_publishes() {
    let (lobby, code, mut clients) = room_of(&["a", "b", "c"]).await;
    for client in &clients {
        lobby.set_ready(client.id, &code, true).await.unwrap();
    }
    for client in &mut clients {
        client.drain();
    }

    lobby.move_up(clients[1].id, &code, 2).await.unwrap();

    assert_eq!(names(&lobby, &code).await, ["a", "b", "c"]);
    assert_eq!(ready_flags(&lobby, &code).await, [false, false, false]);
    for client in &mut clients {
        let update = client.last_update();
        assert!(update.players.iter().all(|p| !p.is_ready));
    }
}

#[tokio::test]
async fn test_reorders_keep_membership_and_single_host() {
    let (lobby, code, mut clients) = room_of(&["a", "b", "c", "d"]).await;

    lobby.move_up(clients[0].id, &code, 1).await.unwrap();
    lobby.move_down(clients[0].id, &code, 3).await.unwrap();
    lobby.move_down(clients[0].id, &code, 1).await.unwrap();

    // [a b c d] → [a c b d] → [a c d b] → [c a d b]
    assert_eq!(names(&lobby, &code).await, ["c", "a", "d", "b"]);
    let roster = lobby.roster(&code).await.unwrap();
    let hosts: Vec<_> = roster.iter().filter(|p| p.is_host).collect();
    assert_eq!(hosts.len(), 1);
    assert!(roster[0].is_host);

    // Each client learns its new seat.
    let c_view = clients[2].drain().pop().unwrap();
    assert_eq!(c_view.as_state_update().unwrap().player_index, 0);
}

#[tokio::test]
async fn test_ready_up_and_down_touch_only_caller() {
    let (lobby, code, clients) = room_of(&["a", "b", "c"]).await;

    lobby.set_ready(clients[1].id, &code, true).await.unwrap();
    assert_eq!(ready_flags(&lobby, &code).await, [false, true, false]);

    lobby.set_ready(clients[2].id, &code, true).await.unwrap();
    lobby.set_ready(clients[1].id, &code, false).await.unwrap();
    assert_eq!(ready_flags(&lobby, &code).await, [false, false, true]);
}

// =========================================================================
// Match lifecycle
// =========================================================================

#[tokio::test]
async fn test_start_sends_start_then_state_update() {
    let (lobby, code, mut clients) = room_of(&["a", "b"]).await;
    let initial = GameState::new(json!({"turn": 0, "status": 0, "players": [null, null]}));
    let settings = json!({"boardSize": 15});

    lobby
        .start_game(clients[0].id, &code, initial, settings.clone())
        .await
        .unwrap();

    for client in &mut clients {
        let messages = client.drain();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            ServerMessage::Start {
                game_settings: settings.clone()
            }
        );
        let update = messages[1].as_state_update().unwrap();
        assert_eq!(update.game_state.as_value()["status"], 1);
    }
    assert_eq!(lobby.status(&code).await, Some(SessionStatus::InProgress));
}

#[tokio::test]
async fn test_end_game_credits_winner_and_reopens_lobby() {
    let (lobby, code, clients) = room_of(&["a", "b", "c"]).await;
    lobby
        .start_game(clients[0].id, &code, GameState::lobby(0), json!({}))
        .await
        .unwrap();
    lobby.set_ready(clients[2].id, &code, true).await.unwrap();

    lobby.end_game(clients[0].id, &code, 2).await.unwrap();

    let roster = lobby.roster(&code).await.unwrap();
    let wins: Vec<u32> = roster.iter().map(|p| p.wins).collect();
    assert_eq!(wins, [0, 0, 1]);
    assert!(roster.iter().all(|p| !p.is_ready));
    assert_eq!(lobby.status(&code).await, Some(SessionStatus::Lobby));
}

#[tokio::test]
async fn test_end_game_with_empty_winner_seat_is_rejected() {
    let (lobby, code, mut clients) = room_of(&["a", "b"]).await;
    lobby
        .start_game(clients[0].id, &code, GameState::lobby(0), json!({}))
        .await
        .unwrap();
    clients[0].drain();

    let err = lobby.end_game(clients[0].id, &code, 3).await.unwrap_err();

    assert_eq!(err.reason(), &SessionError::InvalidSeat(code.clone(), 3));
    assert_eq!(lobby.status(&code).await, Some(SessionStatus::InProgress));
    assert!(clients[0].drain().is_empty());
}

#[tokio::test]
async fn test_broadcast_then_read_yields_payload() {
    let (lobby, code, mut clients) = room_of(&["a", "b"]).await;
    let payload = json!({"map": {"7,7": 0}, "turn": 1, "anything": ["goes", 42]});

    lobby
        .relay_state(
            clients[1].id,
            &code,
            GameState::new(payload.clone()),
            UpdateKind::State,
        )
        .await
        .unwrap();

    assert_eq!(lobby.game_state(&code).await.unwrap().as_value(), &payload);
    let update = clients[0].last_update();
    assert_eq!(update.game_state.as_value(), &payload);
}

#[tokio::test]
async fn test_broadcast_move_publishes_move_update() {
    let (lobby, code, mut clients) = room_of(&["a", "b"]).await;

    lobby
        .relay_state(
            clients[0].id,
            &code,
            GameState::new(json!({"turn": 2})),
            UpdateKind::Move,
        )
        .await
        .unwrap();

    for client in &mut clients {
        let messages = client.drain();
        assert!(matches!(messages.as_slice(), [ServerMessage::StateUpdateMove(_)]));
    }
}

// =========================================================================
// Disconnect
// =========================================================================

#[tokio::test]
async fn test_host_disconnect_closes_room_for_everyone() {
    let (lobby, code, mut clients) = room_of(&["Alice", "Bob", "Cara"]).await;

    let left = lobby.disconnect(clients[0].id).await;

    assert_eq!(left, Some(code.clone()));
    assert_eq!(clients[1].drain(), [ServerMessage::Close]);
    assert_eq!(clients[2].drain(), [ServerMessage::Close]);
    assert_eq!(lobby.session_count().await, 0);
    assert!(lobby.roster(&code).await.is_none());
    assert_eq!(lobby.seat_room(clients[1].id).await, None);

    let err = lobby.set_ready(clients[1].id, &code, true).await.unwrap_err();
    assert_eq!(err, LobbyError::Session(SessionError::NotFound(code)));
}

#[tokio::test]
async fn test_guests_of_closed_room_can_join_elsewhere() {
    let (lobby, code, clients) = room_of(&["Alice", "Bob"]).await;
    lobby.disconnect(clients[0].id).await;
    let dora = Client::new(7);
    let other = create(&lobby, &dora, "Dora").await;

    join(&lobby, &clients[1], &other, "Bob").await;

    assert_ne!(code, other);
    assert_eq!(names(&lobby, &other).await, ["Dora", "Bob"]);
}

#[tokio::test]
async fn test_non_host_disconnect_compacts_and_publishes() {
    let (lobby, code, mut clients) = room_of(&["a", "b", "c", "d"]).await;
    lobby.set_ready(clients[3].id, &code, true).await.unwrap();
    for client in &mut clients {
        client.drain();
    }

    lobby.disconnect(clients[1].id).await;

    assert_eq!(names(&lobby, &code).await, ["a", "c", "d"]);
    assert_eq!(ready_flags(&lobby, &code).await, [false, false, false]);
    assert_eq!(lobby.game_state(&code).await.unwrap().player_slots(), Some(3));
    let d_view = clients[3].last_update();
    assert_eq!(d_view.player_index, 2);
    assert!(d_view.players[0].is_host);
    assert!(clients[1].drain().is_empty());
}

#[tokio::test]
async fn test_disconnect_of_unseated_connection_is_noop() {
    let (lobby, code, _clients) = room_of(&["a", "b"]).await;
    assert_eq!(lobby.disconnect(ConnectionId::new(42)).await, None);
    assert_eq!(names(&lobby, &code).await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_actions_racing_host_disconnect_apply_or_miss_cleanly() {
    let (lobby, code, mut clients) = room_of(&["a", "b", "c", "d"]).await;
    let lobby = Arc::new(lobby);

    let mut actions = Vec::new();
    for round in 0..50 {
        for client in &clients[1..] {
            let lobby = Arc::clone(&lobby);
            let (id, code) = (client.id, code.clone());
            actions.push(tokio::spawn(async move {
                lobby.set_ready(id, &code, round % 2 == 0).await
            }));
        }
    }
    let host = clients[0].id;
    let closer = {
        let lobby = Arc::clone(&lobby);
        tokio::spawn(async move { lobby.disconnect(host).await })
    };

    for action in actions {
        match action.await.unwrap() {
            Ok(()) | Err(LobbyError::Session(SessionError::NotFound(_))) => {}
            Err(other) => panic!("unexpected rejection: {other:?}"),
        }
    }
    assert_eq!(closer.await.unwrap(), Some(code.clone()));
    assert_eq!(lobby.session_count().await, 0);

    for client in &mut clients[1..] {
        let messages = client.drain();
        let closes = messages
            .iter()
            .filter(|msg| **msg == ServerMessage::Close)
            .count();
        assert_eq!(closes, 1, "{messages:?}");
        assert_eq!(messages.last(), Some(&ServerMessage::Close));
    }
}

// =========================================================================
// Diagnostics
// =========================================================================

#[tokio::test]
async fn test_summaries_list_every_live_room() {
    let lobby = Lobby::new();
    let alice = Client::new(1);
    let bob = Client::new(2);
    let cara = Client::new(3);
    let first = create(&lobby, &alice, "Alice").await;
    join(&lobby, &bob, &first, "Bob").await;
    let second = create(&lobby, &cara, "Cara").await;
    lobby
        .start_game(cara.id, &second, GameState::lobby(0), json!({}))
        .await
        .unwrap();

    let summaries = lobby.summaries().await;

    assert_eq!(summaries.len(), 2);
    let of = |code: &RoomCode| summaries.iter().find(|s| &s.code == code).unwrap();
    assert_eq!(of(&first).occupancy, 2);
    assert_eq!(of(&first).status, SessionStatus::Lobby);
    assert_eq!(of(&second).occupancy, 1);
    assert_eq!(of(&second).status, SessionStatus::InProgress);
    assert!(summaries.iter().all(|s| s.capacity == MAX_SEATS));
}
