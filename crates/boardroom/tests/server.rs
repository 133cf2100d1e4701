//! Integration tests for the Boardroom server, handler, and full
//! connection flow over real WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use boardroom::prelude::*;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns its address and registry.
async fn start_server() -> (String, Arc<SessionRegistry>) {
    let server = BoardroomServerBuilder::new()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    let registry = server.registry();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, registry)
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

/// Connects two clients in order; the first gets seat 0.
async fn connect_pair(addr: &str) -> (ClientWs, ClientWs) {
    let first = connect(addr).await;
    // Let the first handler claim the waiting slot before the second
    // connection is accepted.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = connect(addr).await;
    (first, second)
}

async fn next_event(ws: &mut ClientWs) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a server event")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("server event should decode");
        }
    }
}

/// Asserts the server sends nothing for a short while.
async fn expect_silence(ws: &mut ClientWs) {
    let result = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "expected no message, got {result:?}");
}

async fn send_text(ws: &mut ClientWs, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("send should succeed");
}

async fn send_move(ws: &mut ClientWs, x: i64, y: i64) {
    let frame = serde_json::json!({ "event": "move", "data": [x, y] });
    send_text(ws, &frame.to_string()).await;
}

fn empty_board() -> BoardSnapshot {
    vec![vec![Cell::Empty; 3]; 3]
}

/// Reads the start sequence from both seats.
async fn expect_start(seat0: &mut ClientWs, seat1: &mut ClientWs) {
    assert_eq!(next_event(seat0).await, ServerEvent::GameStart);
    assert_eq!(next_event(seat0).await, ServerEvent::Board(empty_board()));
    assert_eq!(next_event(seat0).await, ServerEvent::TurnStart(Seat(0)));
    assert_eq!(next_event(seat1).await, ServerEvent::GameStart);
    assert_eq!(next_event(seat1).await, ServerEvent::Board(empty_board()));
}

/// Plays a move for `seat` and checks the events both players see.
async fn take_turn(mover: &mut ClientWs, other: &mut ClientWs, seat: u8, x: i64, y: i64) {
    send_move(mover, x, y).await;

    let ServerEvent::Board(board) = next_event(mover).await else {
        panic!("mover should receive the board");
    };
    assert_eq!(board[y as usize][x as usize], Cell::Occupied(Seat(seat)));
    assert_eq!(next_event(mover).await, ServerEvent::TurnEnd(Seat(seat)));
    assert_eq!(next_event(other).await, ServerEvent::Board(board));
}

async fn wait_for_empty_registry(registry: &SessionRegistry) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !registry.is_empty().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session should leave the registry");
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_full_game_to_a_win() {
    let (addr, registry) = start_server().await;
    let (mut a, mut b) = connect_pair(&addr).await;
    expect_start(&mut a, &mut b).await;
    assert_eq!(registry.len().await, 1);

    take_turn(&mut a, &mut b, 0, 0, 0).await;
    assert_eq!(next_event(&mut b).await, ServerEvent::TurnStart(Seat(1)));
    take_turn(&mut b, &mut a, 1, 1, 0).await;
    assert_eq!(next_event(&mut a).await, ServerEvent::TurnStart(Seat(0)));
    take_turn(&mut a, &mut b, 0, 0, 1).await;
    assert_eq!(next_event(&mut b).await, ServerEvent::TurnStart(Seat(1)));
    take_turn(&mut b, &mut a, 1, 1, 1).await;
    assert_eq!(next_event(&mut a).await, ServerEvent::TurnStart(Seat(0)));
    take_turn(&mut a, &mut b, 0, 0, 2).await;

    let winner = ServerEvent::GameEnd(Outcome::Winner(Seat(0)));
    assert_eq!(next_event(&mut a).await, winner);
    assert_eq!(next_event(&mut b).await, winner);
    wait_for_empty_registry(&registry).await;

    // The sockets stay open, but moves no longer go anywhere.
    send_move(&mut b, 2, 2).await;
    expect_silence(&mut a).await;
    expect_silence(&mut b).await;
}

#[tokio::test]
async fn test_bad_input_is_ignored_silently() {
    let (addr, _registry) = start_server().await;
    let (mut a, mut b) = connect_pair(&addr).await;
    expect_start(&mut a, &mut b).await;

    // Out of range, wrong turn, malformed coordinates, and garbage frames.
    send_move(&mut a, 5, 5).await;
    send_move(&mut b, 1, 1).await;
    send_text(&mut a, r#"{"event":"move","data":["x",1]}"#).await;
    send_text(&mut a, "not json").await;
    send_text(&mut a, r#"{"event":"chat","data":"hi"}"#).await;
    expect_silence(&mut a).await;
    expect_silence(&mut b).await;

    // Seat 0 still holds the turn and the board is untouched.
    take_turn(&mut a, &mut b, 0, 1, 1).await;
    assert_eq!(next_event(&mut b).await, ServerEvent::TurnStart(Seat(1)));
}

#[tokio::test]
async fn test_string_coordinates_are_accepted() {
    let (addr, _registry) = start_server().await;
    let (mut a, mut b) = connect_pair(&addr).await;
    expect_start(&mut a, &mut b).await;

    send_text(&mut a, r#"{"event":"move","data":["2","0"]}"#).await;
    let ServerEvent::Board(board) = next_event(&mut a).await else {
        panic!("expected a board");
    };
    assert_eq!(board[0][2], Cell::Occupied(Seat(0)));
}

#[tokio::test]
async fn test_disconnect_aborts_the_game() {
    let (addr, registry) = start_server().await;
    let (mut a, mut b) = connect_pair(&addr).await;
    expect_start(&mut a, &mut b).await;

    b.close(None).await.expect("close should succeed");

    assert_eq!(next_event(&mut a).await, ServerEvent::GameEnd(Outcome::Aborted));
    wait_for_empty_registry(&registry).await;
    expect_silence(&mut a).await;
}

#[tokio::test]
async fn test_third_client_waits_for_an_opponent() {
    let (addr, registry) = start_server().await;
    let (mut a, mut b) = connect_pair(&addr).await;
    expect_start(&mut a, &mut b).await;

    let mut c = connect(&addr).await;
    expect_silence(&mut c).await;
    assert_eq!(registry.len().await, 1);

    // A fourth arrival pairs with the waiting third.
    let mut d = connect(&addr).await;
    expect_start(&mut c, &mut d).await;
    assert_eq!(registry.len().await, 2);
}

#[tokio::test]
async fn test_waiting_client_that_leaves_is_not_paired() {
    let (addr, registry) = start_server().await;

    let mut a = connect(&addr).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    a.close(None).await.expect("close should succeed");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut b = connect(&addr).await;
    expect_silence(&mut b).await;
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_serve_rejects_port_zero() {
    let err = serve(0).await.unwrap_err();
    assert!(matches!(err, BoardroomError::Config(_)));
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let server = BoardroomServerBuilder::new()
        .bind("127.0.0.1:0")
        .build()
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();

    let result = BoardroomServerBuilder::new().bind(&addr).build().await;
    assert!(matches!(result, Err(BoardroomError::Transport(_))));
}

#[tokio::test]
async fn test_zero_move_buffer_is_rejected() {
    let result = BoardroomServerBuilder::new()
        .bind("127.0.0.1:0")
        .move_buffer(0)
        .build()
        .await;
    assert!(matches!(result, Err(BoardroomError::Config(_))));
}
