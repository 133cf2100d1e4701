//! Integration tests for pairing connections into sessions.

use std::sync::Arc;
use std::time::Duration;

use boardroom_game::{Matchmaker, Outbound, Pairing, Participant, SessionId, SessionRegistry};
use boardroom_protocol::{Outcome, Seat, ServerEvent};
use boardroom_transport::ConnectionId;
use tokio::sync::mpsc::{self, UnboundedReceiver};

// =========================================================================
// Helpers
// =========================================================================

type Inbox = UnboundedReceiver<Outbound>;

fn cid(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn participant(id: u64) -> (Participant, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Participant::new(cid(id), tx), rx)
}

fn matchmaker() -> Matchmaker {
    Matchmaker::new(Arc::new(SessionRegistry::new())).with_move_buffer(8)
}

async fn recv(rx: &mut Inbox) -> Option<Outbound> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an outbound message")
}

// =========================================================================
// Pairing
// =========================================================================

#[tokio::test]
async fn test_arrivals_are_paired_in_order() {
    let mm = matchmaker();
    let (a, mut rx_a) = participant(1);
    let (b, mut rx_b) = participant(2);
    let (c, _rx_c) = participant(3);

    assert_eq!(mm.on_connect(a).await.unwrap(), Pairing::Waiting);
    assert_eq!(mm.waiting_id().await, Some(cid(1)));

    assert_eq!(
        mm.on_connect(b).await.unwrap(),
        Pairing::Paired(SessionId(1))
    );
    assert_eq!(mm.waiting_id().await, None);

    assert_eq!(mm.on_connect(c).await.unwrap(), Pairing::Waiting);
    assert_eq!(mm.waiting_id().await, Some(cid(3)));

    // The earlier arrival takes seat 0.
    let Some(Outbound::Seated(binding_a)) = recv(&mut rx_a).await else {
        panic!("A was not seated");
    };
    let Some(Outbound::Seated(binding_b)) = recv(&mut rx_b).await else {
        panic!("B was not seated");
    };
    assert_eq!(binding_a.seat, Seat(0));
    assert_eq!(binding_b.seat, Seat(1));
    assert_eq!(binding_a.session.session_id(), SessionId(1));

    assert_eq!(mm.registry().len().await, 1);
    assert!(mm.registry().contains(SessionId(1)).await);
}

#[tokio::test]
async fn test_seated_precedes_game_start() {
    let mm = matchmaker();
    let (a, mut rx_a) = participant(5);
    let (b, _rx_b) = participant(6);
    mm.on_connect(a).await.unwrap();
    mm.on_connect(b).await.unwrap();

    assert!(matches!(recv(&mut rx_a).await, Some(Outbound::Seated(_))));
    assert!(matches!(
        recv(&mut rx_a).await,
        Some(Outbound::Event(ServerEvent::GameStart))
    ));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let mm = matchmaker();
    let mut inboxes = Vec::new();
    for id in 1..=4 {
        let (p, rx) = participant(id);
        mm.on_connect(p).await.unwrap();
        inboxes.push(rx);
    }
    assert_eq!(mm.registry().ids().await, vec![SessionId(1), SessionId(3)]);

    // Ending the first game leaves the second untouched.
    let Some(Outbound::Seated(binding)) = recv(&mut inboxes[0]).await else {
        panic!("first player was not seated");
    };
    binding.session.leave(binding.seat).unwrap();

    let second = mm.registry().get(SessionId(3)).await.unwrap();
    let info = second.info().await.unwrap();
    assert!(!info.state.is_finished());
    assert_eq!(info.participants, vec![cid(3), cid(4)]);
}

// =========================================================================
// Waiting slot
// =========================================================================

#[tokio::test]
async fn test_waiting_participant_can_leave() {
    let mm = matchmaker();
    let (a, _rx_a) = participant(1);
    let (b, _rx_b) = participant(2);

    mm.on_connect(a).await.unwrap();
    assert!(mm.on_disconnect(cid(1)).await);
    assert_eq!(mm.waiting_id().await, None);

    assert_eq!(mm.on_connect(b).await.unwrap(), Pairing::Waiting);
    assert_eq!(mm.waiting_id().await, Some(cid(2)));
}

#[tokio::test]
async fn test_stale_waiting_participant_is_discarded() {
    let mm = matchmaker();
    let (a, rx_a) = participant(1);
    let (b, _rx_b) = participant(2);

    mm.on_connect(a).await.unwrap();
    drop(rx_a);

    assert_eq!(mm.on_connect(b).await.unwrap(), Pairing::Waiting);
    assert_eq!(mm.waiting_id().await, Some(cid(2)));
    assert!(mm.registry().is_empty().await);
}

#[tokio::test]
async fn test_disconnect_of_non_waiting_connection() {
    let mm = matchmaker();
    assert!(!mm.on_disconnect(cid(9)).await);

    let (a, _rx_a) = participant(1);
    let (b, _rx_b) = participant(2);
    mm.on_connect(a).await.unwrap();
    mm.on_connect(b).await.unwrap();

    // Seated connections are no longer the matchmaker's concern.
    assert!(!mm.on_disconnect(cid(1)).await);
    assert!(!mm.on_disconnect(cid(2)).await);
}

// =========================================================================
// Lifecycle
// =========================================================================

#[tokio::test]
async fn test_finished_session_leaves_registry() {
    let mm = matchmaker();
    let (a, mut rx_a) = participant(1);
    let (b, mut rx_b) = participant(2);
    mm.on_connect(a).await.unwrap();
    mm.on_connect(b).await.unwrap();

    let Some(Outbound::Seated(binding)) = recv(&mut rx_b).await else {
        panic!("B was not seated");
    };
    binding.session.leave(binding.seat).unwrap();

    let mut last = None;
    while let Some(outbound) = recv(&mut rx_a).await {
        last = Some(outbound);
    }
    assert!(matches!(
        last,
        Some(Outbound::Event(ServerEvent::GameEnd(Outcome::Aborted)))
    ));

    tokio::time::timeout(Duration::from_secs(2), async {
        while !mm.registry().is_empty().await {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("session was not removed from the registry");
}
