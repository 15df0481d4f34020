//! Tests for frame routing through the connection adapter.

use strictly_battleship::{Connection, GameError, Outbound, PlayerId, SessionRegistry};
use tokio::sync::mpsc::{self, UnboundedReceiver};

const LEFT_FLEET: &str = "0,0,0,1,0,2,0,3,0,4,0,5,0,6,0,7,0,8,0,9,1,0,1,1,1,2,1,3,1,4,1,5,1,6";
const RIGHT_FLEET: &str = "0,0,2,1,2,2,2,3,2,4,2,5,2,6,2,7,2,8,2,9,3,0,3,1,3,2,3,3,3,4,3,5,3,6";

fn connect(registry: &SessionRegistry, id: i64) -> (Connection, UnboundedReceiver<Outbound>) {
    let (outbox, inbox) = mpsc::unbounded_channel();
    (
        Connection::open(PlayerId::from(id), registry.clone(), outbox),
        inbox,
    )
}

fn drain(inbox: &mut UnboundedReceiver<Outbound>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Ok(frame) = inbox.try_recv() {
        frames.push(frame.to_string());
    }
    frames
}

#[test]
fn test_end_to_end_scenario() {
    let registry = SessionRegistry::new();
    let (a, mut a_inbox) = connect(&registry, 10);
    let (b, mut b_inbox) = connect(&registry, 20);

    a.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();
    b.handle_frame(&format!("g1;{}", RIGHT_FLEET)).unwrap();
    assert_eq!(drain(&mut a_inbox), vec!["your turn"]);
    assert_eq!(drain(&mut b_inbox), vec!["opponent's turn"]);

    // B placed a ship at (0,0).
    a.handle_frame("0,0").unwrap();
    assert_eq!(drain(&mut a_inbox), vec!["0,0;hit"]);
    assert_eq!(drain(&mut b_inbox), vec!["0,0;hit"]);

    let a_view = registry.snapshot(PlayerId::from(10)).unwrap();
    let b_view = registry.snapshot(PlayerId::from(20)).unwrap();
    assert!(!a_view.turn().has_turn());
    assert!(b_view.turn().has_turn());
}

#[test]
fn test_malformed_move_rejected_without_mutation() {
    let registry = SessionRegistry::new();
    let (a, mut a_inbox) = connect(&registry, 1);
    let (b, mut b_inbox) = connect(&registry, 2);
    a.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();
    b.handle_frame(&format!("g1;{}", RIGHT_FLEET)).unwrap();
    drain(&mut a_inbox);
    drain(&mut b_inbox);

    let err = a.handle_frame("abc,2").unwrap_err();
    assert!(matches!(err, GameError::MalformedMove(_)));
    assert_eq!(drain(&mut a_inbox), vec!["error;malformed move: 'abc' is not an integer"]);
    assert!(drain(&mut b_inbox).is_empty());

    for id in [1, 2] {
        let view = registry.snapshot(PlayerId::from(id)).unwrap();
        assert_eq!(view.shots().occupied_count(), 0);
    }
    assert!(registry.snapshot(PlayerId::from(1)).unwrap().turn().has_turn());

    // The connection keeps going after a rejected frame.
    a.handle_frame("5,5").unwrap();
    assert_eq!(drain(&mut a_inbox), vec!["5,5;miss"]);
}

#[test]
fn test_malformed_setup_creates_no_session() {
    let registry = SessionRegistry::new();
    let (a, mut a_inbox) = connect(&registry, 1);

    assert!(a.handle_frame("g1;0,0,1,1").is_err());
    assert!(!registry.has_session(PlayerId::from(1)));
    let frames = drain(&mut a_inbox);
    assert_eq!(frames.len(), 1);
    assert!(frames[0].starts_with("error;malformed setup"));

    a.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();
    assert!(registry.has_session(PlayerId::from(1)));
}

#[test]
fn test_out_of_turn_move_reports_error() {
    let registry = SessionRegistry::new();
    let (a, _a_inbox) = connect(&registry, 1);
    let (b, mut b_inbox) = connect(&registry, 2);
    a.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();
    b.handle_frame(&format!("g1;{}", RIGHT_FLEET)).unwrap();
    drain(&mut b_inbox);

    assert_eq!(b.handle_frame("4,4").unwrap_err(), GameError::NotYourTurn);
    assert_eq!(drain(&mut b_inbox), vec!["error;not your turn"]);
}

#[test]
fn test_out_of_range_move_reports_invalid_coordinate() {
    let registry = SessionRegistry::new();
    let (a, mut a_inbox) = connect(&registry, 1);
    let (b, _b_inbox) = connect(&registry, 2);
    a.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();
    b.handle_frame(&format!("g1;{}", RIGHT_FLEET)).unwrap();
    drain(&mut a_inbox);

    assert_eq!(
        a.handle_frame("10,3").unwrap_err(),
        GameError::InvalidCoordinate { x: 10, y: 3 }
    );
    assert_eq!(drain(&mut a_inbox), vec!["error;invalid coordinate 10,3"]);
}

#[test]
fn test_close_notifies_opponent_and_releases_both() {
    let registry = SessionRegistry::new();
    let (a, _a_inbox) = connect(&registry, 1);
    let (b, mut b_inbox) = connect(&registry, 2);
    a.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();
    b.handle_frame(&format!("g1;{}", RIGHT_FLEET)).unwrap();
    drain(&mut b_inbox);

    a.close();
    assert_eq!(drain(&mut b_inbox), vec!["opponent left"]);
    assert_eq!(registry.session_count(), 0);

    // B's next frame starts a new game.
    b.handle_frame(&format!("g2;{}", RIGHT_FLEET)).unwrap();
    assert!(registry.has_session(PlayerId::from(2)));
}

#[test]
fn test_write_failure_does_not_block_other_player() {
    let registry = SessionRegistry::new();
    let (a, a_inbox) = connect(&registry, 1);
    let (b, mut b_inbox) = connect(&registry, 2);
    a.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();
    b.handle_frame(&format!("g1;{}", RIGHT_FLEET)).unwrap();
    drain(&mut b_inbox);

    // A's writer has gone away.
    drop(a_inbox);
    a.handle_frame("0,0").unwrap();
    assert_eq!(drain(&mut b_inbox), vec!["0,0;hit"]);
}

#[test]
fn test_stale_connection_close_leaves_newer_session() {
    let registry = SessionRegistry::new();
    let (old, _old_inbox) = connect(&registry, 1);
    let (new, _new_inbox) = connect(&registry, 1);
    new.handle_frame(&format!("g1;{}", LEFT_FLEET)).unwrap();

    old.close();
    assert!(registry.has_session(PlayerId::from(1)));
}
