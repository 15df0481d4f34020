//! Turn ownership for one participant.
//!
//! Each session entry carries exactly one of these. Pairing and turn
//! passing are the only transitions; a finished game is evicted from the
//! registry instead of being kept in a terminal variant.

use super::types::PlayerId;
use serde::{Deserialize, Serialize};

/// Where a participant stands in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    /// Fleet placed, no opponent has joined the game id yet.
    AwaitingOpponent,
    /// Paired; the opponent fires next.
    WaitingTurn {
        /// The paired participant.
        opponent: PlayerId,
    },
    /// Paired; this participant fires next.
    ActiveTurn {
        /// The paired participant.
        opponent: PlayerId,
    },
}

impl TurnState {
    /// State for the participant who was already waiting when the game
    /// filled up. The earlier arrival fires first.
    pub fn pair_first(opponent: PlayerId) -> Self {
        TurnState::ActiveTurn { opponent }
    }

    /// State for the participant whose arrival completed the pairing.
    pub fn pair_second(opponent: PlayerId) -> Self {
        TurnState::WaitingTurn { opponent }
    }

    /// The paired opponent, if any.
    pub fn opponent(&self) -> Option<PlayerId> {
        match self {
            TurnState::AwaitingOpponent => None,
            TurnState::WaitingTurn { opponent } | TurnState::ActiveTurn { opponent } => {
                Some(*opponent)
            }
        }
    }

    /// Whether this participant may fire now.
    pub fn has_turn(&self) -> bool {
        matches!(self, TurnState::ActiveTurn { .. })
    }

    /// Hands the turn to the opponent. Only meaningful from `ActiveTurn`.
    pub fn pass(self) -> Self {
        match self {
            TurnState::ActiveTurn { opponent } => TurnState::WaitingTurn { opponent },
            other => other,
        }
    }

    /// Receives the turn from the opponent. Only meaningful from `WaitingTurn`.
    pub fn take(self) -> Self {
        match self {
            TurnState::WaitingTurn { opponent } => TurnState::ActiveTurn { opponent },
            other => other,
        }
    }
}
