//! Tests for the text frame protocol.

use strictly_battleship::{
    Coordinate, Ending, GameError, MoveCommand, MoveReport, Outbound, SHIP_CELLS, SetupCommand,
    Shot,
};

fn fleet_frame(game: &str) -> String {
    let pairs: Vec<String> = (0..17).map(|i| format!("{},{}", i / 10, i % 10)).collect();
    format!("{};{}", game, pairs.join(","))
}

#[test]
fn test_valid_setup_places_seventeen_cells() {
    let setup: SetupCommand = fleet_frame("g1").parse().expect("Valid setup");
    assert_eq!(setup.game_id.as_str(), "g1");
    assert_eq!(setup.fleet.occupied_count(), SHIP_CELLS);
}

#[test]
fn test_setup_with_non_integer_rejected() {
    let frame = fleet_frame("g1").replacen("0,0", "0,x", 1);
    assert!(matches!(
        frame.parse::<SetupCommand>(),
        Err(GameError::MalformedSetup(_))
    ));
}

#[test]
fn test_setup_with_extra_pair_rejected() {
    let frame = format!("{},9,9", fleet_frame("g1"));
    assert!(matches!(
        frame.parse::<SetupCommand>(),
        Err(GameError::MalformedSetup(_))
    ));
}

#[test]
fn test_setup_with_empty_game_id_rejected() {
    let frame = fleet_frame("  ");
    assert!(matches!(
        frame.parse::<SetupCommand>(),
        Err(GameError::MalformedSetup(_))
    ));
}

#[test]
fn test_setup_out_of_range_cell_rejected() {
    let frame = fleet_frame("g1").replacen("0,0", "0,12", 1);
    assert_eq!(
        frame.parse::<SetupCommand>(),
        Err(GameError::InvalidCoordinate { x: 0, y: 12 })
    );
}

#[test]
fn test_move_parses() {
    let mv: MoveCommand = " 2 , 8 ".parse().expect("Valid move");
    assert_eq!(mv.target, Coordinate::new(2, 8).unwrap());
}

#[test]
fn test_malformed_moves_rejected() {
    assert!(matches!(
        "abc,2".parse::<MoveCommand>(),
        Err(GameError::MalformedMove(_))
    ));
    assert!(matches!(
        "4".parse::<MoveCommand>(),
        Err(GameError::MalformedMove(_))
    ));
    assert!(matches!(
        "1,2,3".parse::<MoveCommand>(),
        Err(GameError::MalformedMove(_))
    ));
}

#[test]
fn test_result_frame_reencodes_identically() {
    for frame in ["0,0;hit", "9,3;miss", "4,4;hit;win", "4,4;hit;loss"] {
        let report: MoveReport = frame.parse().expect("Valid result frame");
        assert_eq!(report.to_string(), frame);
    }
}

#[test]
fn test_result_frame_fields() {
    let report: MoveReport = "7,1;hit;loss".parse().unwrap();
    assert_eq!(report.target, Coordinate::new(7, 1).unwrap());
    assert_eq!(report.shot, Shot::Hit);
    assert_eq!(report.ending, Some(Ending::Loss));
}

#[test]
fn test_bad_result_frames_rejected() {
    assert!("1,1;boom".parse::<MoveReport>().is_err());
    assert!("1,1;hit;draw".parse::<MoveReport>().is_err());
    assert!("1,1;hit;win;again".parse::<MoveReport>().is_err());
}

#[test]
fn test_bad_result_frame_is_not_reported_as_a_move() {
    let err = "x,1;hit".parse::<MoveReport>().unwrap_err();
    assert_eq!(err, GameError::MalformedReport("x,1;hit".to_string()));
    assert_eq!(err.to_string(), "malformed result frame 'x,1;hit'");

    assert_eq!(
        "1,1;boom".parse::<MoveReport>(),
        Err(GameError::MalformedReport("1,1;boom".to_string()))
    );
    assert_eq!(
        "12,1;hit".parse::<MoveReport>(),
        Err(GameError::InvalidCoordinate { x: 12, y: 1 })
    );
}

#[test]
fn test_notice_frames() {
    assert_eq!(Outbound::YourTurn.to_string(), "your turn");
    assert_eq!(Outbound::OpponentsTurn.to_string(), "opponent's turn");
    assert_eq!(Outbound::OpponentLeft.to_string(), "opponent left");
    assert_eq!(Outbound::Expired.to_string(), "expired");
    assert_eq!(
        Outbound::Rejected(GameError::NoOpponent).to_string(),
        "error;no opponent yet"
    );
}
