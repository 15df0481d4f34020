//! Fixed-size boolean grid used for both fleets and guesses.

use super::types::{Coordinate, GRID_SIZE, SHIP_CELLS};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 10x10 grid of flags.
///
/// A participant owns two of these: the placement board (where their ships
/// sit, fixed after setup) and the guess board (cells they have fired at,
/// only ever growing). Cells are never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a placement board from a fleet's cells.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MalformedSetup`] if the fleet does not cover
    /// exactly [`SHIP_CELLS`] distinct cells.
    #[instrument(skip(cells), fields(cells = cells.len()))]
    pub fn from_cells(cells: &[Coordinate]) -> Result<Self, GameError> {
        let mut board = Self::new();
        for &cell in cells {
            if board.is_occupied(cell) {
                return Err(GameError::MalformedSetup(format!(
                    "cell {} placed twice",
                    cell
                )));
            }
            board.occupy(cell);
        }
        if board.occupied_count() != SHIP_CELLS {
            return Err(GameError::MalformedSetup(format!(
                "fleet covers {} cells, expected {}",
                board.occupied_count(),
                SHIP_CELLS
            )));
        }
        Ok(board)
    }

    /// Marks a placement cell.
    pub fn occupy(&mut self, cell: Coordinate) {
        self.cells[cell.x()][cell.y()] = true;
    }

    /// Marks a guessed cell. Guessing the same cell twice is a no-op.
    pub fn record_guess(&mut self, cell: Coordinate) {
        self.cells[cell.x()][cell.y()] = true;
    }

    /// Whether a ship sits on the cell.
    pub fn is_occupied(&self, cell: Coordinate) -> bool {
        self.cells[cell.x()][cell.y()]
    }

    /// Whether the cell has been fired at.
    pub fn is_guessed(&self, cell: Coordinate) -> bool {
        self.cells[cell.x()][cell.y()]
    }

    /// Total number of set cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&set| set).count()
    }

    /// Number of cells set on both this guess board and `fleet`.
    pub fn hits_against(&self, fleet: &Board) -> usize {
        self.cells
            .iter()
            .flatten()
            .zip(fleet.cells.iter().flatten())
            .filter(|&(&guessed, &occupied)| guessed && occupied)
            .count()
    }
}
