//! Shot resolution and win detection.

use super::board::Board;
use super::types::{Coordinate, SHIP_CELLS, Shot};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// What a single accepted move produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The cell fired at.
    pub target: Coordinate,
    /// Hit or miss.
    pub shot: Shot,
    /// Whether this shot sank the last ship cell.
    pub finished: bool,
}

/// Fires at `target`, recording it on the attacker's guess board.
///
/// The game is over once the guesses cover every cell of the defending
/// fleet. Repeat guesses do not count twice because the guess board is a
/// set of cells.
#[instrument(skip(shots, fleet))]
pub fn resolve_shot(shots: &mut Board, fleet: &Board, target: Coordinate) -> MoveOutcome {
    shots.record_guess(target);
    let shot = if fleet.is_occupied(target) {
        Shot::Hit
    } else {
        Shot::Miss
    };
    let finished = shots.hits_against(fleet) == SHIP_CELLS;
    MoveOutcome {
        target,
        shot,
        finished,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> (Board, Vec<Coordinate>) {
        // First 17 cells in reading order.
        let cells: Vec<Coordinate> = (0..17)
            .map(|i| Coordinate::new(i / 10, i % 10).unwrap())
            .collect();
        (Board::from_cells(&cells).unwrap(), cells)
    }

    #[test]
    fn test_miss_on_open_water() {
        let (fleet, _) = fleet();
        let mut shots = Board::new();
        let outcome = resolve_shot(&mut shots, &fleet, Coordinate::new(9, 9).unwrap());
        assert_eq!(outcome.shot, Shot::Miss);
        assert!(!outcome.finished);
        assert!(shots.is_guessed(Coordinate::new(9, 9).unwrap()));
    }

    #[test]
    fn test_hit_on_ship() {
        let (fleet, _) = fleet();
        let mut shots = Board::new();
        let outcome = resolve_shot(&mut shots, &fleet, Coordinate::new(0, 3).unwrap());
        assert_eq!(outcome.shot, Shot::Hit);
        assert!(!outcome.finished);
    }

    #[test]
    fn test_last_ship_cell_finishes_game() {
        let (fleet, cells) = fleet();
        let mut shots = Board::new();
        for cell in &cells[..16] {
            assert!(!resolve_shot(&mut shots, &fleet, *cell).finished);
        }
        let last = resolve_shot(&mut shots, &fleet, cells[16]);
        assert_eq!(last.shot, Shot::Hit);
        assert!(last.finished);
    }

    #[test]
    fn test_repeated_hit_does_not_count_twice() {
        let (fleet, cells) = fleet();
        let mut shots = Board::new();
        for _ in 0..20 {
            resolve_shot(&mut shots, &fleet, cells[0]);
        }
        assert_eq!(shots.hits_against(&fleet), 1);
        assert!(!resolve_shot(&mut shots, &fleet, cells[0]).finished);
    }
}
