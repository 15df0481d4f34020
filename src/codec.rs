//! Text frame protocol between players and the coordinator.
//!
//! Inbound:
//! - setup, first frame only: `gameId;x1,y1,...,x17,y17`
//! - move, every later frame: `x,y`
//!
//! Outbound:
//! - pairing notice: `your turn` / `opponent's turn`
//! - move result: `x,y;hit|miss` plus `;win` or `;loss` on the final shot
//! - `error;<reason>` for a rejected frame
//! - `opponent left` when the paired player disconnects
//! - `expired` when nobody joined the game in time

use crate::error::GameError;
use crate::games::battleship::{Board, Coordinate, GameId, MoveOutcome, SHIP_CELLS, Shot};
use derive_more::Display;
use std::str::FromStr;
use tracing::instrument;

/// Decoded setup frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupCommand {
    /// Game both participants joined.
    pub game_id: GameId,
    /// Placement board built from the listed cells.
    pub fleet: Board,
}

impl FromStr for SetupCommand {
    type Err = GameError;

    #[instrument(name = "decode_setup")]
    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        let (game, cells) = frame
            .split_once(';')
            .ok_or_else(|| GameError::MalformedSetup("missing ';' separator".to_string()))?;
        let game_id = GameId::new(game)?;

        let values = cells
            .split(',')
            .map(|token| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| {
                    GameError::MalformedSetup(format!("'{}' is not an integer", token))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if values.len() != SHIP_CELLS * 2 {
            return Err(GameError::MalformedSetup(format!(
                "expected {} integers, got {}",
                SHIP_CELLS * 2,
                values.len()
            )));
        }

        let cells = values
            .chunks_exact(2)
            .map(|pair| Coordinate::new(pair[0], pair[1]))
            .collect::<Result<Vec<_>, _>>()?;
        let fleet = Board::from_cells(&cells)?;

        Ok(Self { game_id, fleet })
    }
}

/// Decoded move frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    /// Cell to fire at.
    pub target: Coordinate,
}

impl FromStr for MoveCommand {
    type Err = GameError;

    #[instrument(name = "decode_move")]
    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        let (x, y) = frame
            .split_once(',')
            .ok_or_else(|| GameError::MalformedMove("missing second value".to_string()))?;
        let parse = |token: &str| {
            let token = token.trim();
            token
                .parse::<i64>()
                .map_err(|_| GameError::MalformedMove(format!("'{}' is not an integer", token)))
        };
        let target = Coordinate::new(parse(x)?, parse(y)?)?;
        Ok(Self { target })
    }
}

/// Trailing marker on the final result frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Ending {
    /// Sent to the player who fired the last shot.
    Win,
    /// Sent to the player whose fleet was sunk.
    Loss,
}

/// One participant's view of an accepted move.
///
/// Both participants see the same cell and result; only the ending marker
/// differs on the final shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// The cell fired at.
    pub target: Coordinate,
    /// Hit or miss.
    pub shot: Shot,
    /// Present only on the shot that ended the game.
    pub ending: Option<Ending>,
}

impl MoveReport {
    /// Report for the player who fired.
    pub fn for_attacker(outcome: &MoveOutcome) -> Self {
        Self::from_outcome(outcome, Ending::Win)
    }

    /// Report for the player who was fired at.
    pub fn for_defender(outcome: &MoveOutcome) -> Self {
        Self::from_outcome(outcome, Ending::Loss)
    }

    fn from_outcome(outcome: &MoveOutcome, ending: Ending) -> Self {
        Self {
            target: outcome.target,
            shot: outcome.shot,
            ending: outcome.finished.then_some(ending),
        }
    }
}

impl std::fmt::Display for MoveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};{}", self.target, self.shot)?;
        if let Some(ending) = self.ending {
            write!(f, ";{}", ending)?;
        }
        Ok(())
    }
}

impl FromStr for MoveReport {
    type Err = GameError;

    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        let malformed = || GameError::MalformedReport(frame.to_string());
        let mut parts = frame.split(';');
        let target = parts
            .next()
            .ok_or_else(malformed)?
            .parse::<MoveCommand>()
            .map_err(|e| match e {
                GameError::MalformedMove(_) => malformed(),
                other => other,
            })?
            .target;
        let shot = parts
            .next()
            .and_then(|s| Shot::from_str(s).ok())
            .ok_or_else(malformed)?;
        let ending = match parts.next() {
            Some(marker) => Some(Ending::from_str(marker).map_err(|_| malformed())?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self {
            target,
            shot,
            ending,
        })
    }
}

/// Every frame the coordinator sends.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Outbound {
    /// Pairing complete, you fire first.
    #[display("your turn")]
    YourTurn,
    /// Pairing complete, your opponent fires first.
    #[display("opponent's turn")]
    OpponentsTurn,
    /// Result of an accepted move.
    #[display("{}", _0)]
    Report(MoveReport),
    /// The last frame from this participant was rejected.
    #[display("error;{}", _0)]
    Rejected(GameError),
    /// The paired participant disconnected; the game is over.
    #[display("opponent left")]
    OpponentLeft,
    /// Nobody joined the game before the waiting timeout.
    #[display("expired")]
    Expired,
}
