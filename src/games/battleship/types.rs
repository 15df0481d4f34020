//! Core domain types for battleship.

use crate::error::GameError;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Width and height of every grid.
pub const GRID_SIZE: usize = 10;

/// Cells covered by the standard fleet (5 + 4 + 3 + 3 + 2).
///
/// A fleet must place exactly this many cells, and sinking this many
/// ends the game.
pub const SHIP_CELLS: usize = 17;

/// Opaque participant identity handed in by the transport layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(i64);

impl PlayerId {
    /// Returns the raw identity value.
    pub fn value(self) -> i64 {
        self.0
    }
}

/// Identifier both participants of one game agree on out of band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameId(String);

impl GameId {
    /// Creates a game identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MalformedSetup`] if the identifier is empty.
    #[instrument(skip(raw))]
    pub fn new(raw: &str) -> Result<Self, GameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GameError::MalformedSetup("empty game id".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GameId {
    type Error = GameError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> Self {
        id.0
    }
}

/// A cell on the grid, guaranteed to be in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{},{}", x, y)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    x: u8,
    y: u8,
}

/// Unchecked wire form of a [`Coordinate`].
#[derive(Debug, Deserialize)]
struct RawCoordinate {
    x: i64,
    y: i64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GameError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.x, raw.y)
    }
}

impl Coordinate {
    /// Validates a raw coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidCoordinate`] if either axis falls
    /// outside `0..GRID_SIZE`.
    pub fn new(x: i64, y: i64) -> Result<Self, GameError> {
        let in_range = |v: i64| (0..GRID_SIZE as i64).contains(&v);
        if !in_range(x) || !in_range(y) {
            return Err(GameError::InvalidCoordinate { x, y });
        }
        Ok(Self {
            x: x as u8,
            y: y as u8,
        })
    }

    /// Column index.
    pub fn x(self) -> usize {
        self.x as usize
    }

    /// Row index.
    pub fn y(self) -> usize {
        self.y as usize
    }
}

/// Result of firing at a single cell.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Shot {
    /// The defender has a ship on the target cell.
    Hit,
    /// Open water.
    Miss,
}
