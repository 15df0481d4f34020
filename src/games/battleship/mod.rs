//! Battleship rules: grids, turn ownership and shot resolution.

mod board;
mod rules;
mod turn;
mod types;

pub use board::Board;
pub use rules::{MoveOutcome, resolve_shot};
pub use turn::TurnState;
pub use types::{Coordinate, GRID_SIZE, GameId, PlayerId, SHIP_CELLS, Shot};
