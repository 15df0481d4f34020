//! Error types for the battleship coordinator.

use derive_more::{Display, Error};
use tracing::instrument;

/// Frame-level failure while decoding or applying a participant's message.
///
/// These never terminate a connection task: the adapter reports them to the
/// sender as an `error;<reason>` frame and keeps reading.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// Setup frame did not match `gameId;x1,y1,...,x17,y17`.
    #[display("malformed setup: {}", _0)]
    MalformedSetup(#[error(not(source))] String),

    /// Move frame did not match `x,y`.
    #[display("malformed move: {}", _0)]
    MalformedMove(#[error(not(source))] String),

    /// Result frame did not match `x,y;hit|miss[;win|loss]`.
    #[display("malformed result frame '{}'", _0)]
    MalformedReport(#[error(not(source))] String),

    /// Target lies outside the 10x10 grid.
    #[display("invalid coordinate {},{}", x, y)]
    InvalidCoordinate {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
    },

    /// Move received before an opponent joined.
    #[display("no opponent yet")]
    NoOpponent,

    /// Move received while the opponent holds the turn.
    #[display("not your turn")]
    NotYourTurn,

    /// Game identifier already has two participants playing.
    #[display("game {} is already being played", _0)]
    GameIdentifierConflict(#[error(not(source))] String),

    /// Setup received from an identity that already has a session.
    #[display("already in a session")]
    AlreadyInSession,

    /// Move received from an identity without a session.
    #[display("no active session")]
    NoSession,

    /// A paired entry whose opponent is missing or points elsewhere.
    #[display("session pairing is inconsistent")]
    BrokenPairing,
}

/// Server bootstrap error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Server error: {} at {}:{}", message, file, line)]
pub struct ServerError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ServerError {
    /// Creates a new server error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}
