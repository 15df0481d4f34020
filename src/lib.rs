//! Strictly Battleship - two-player battleship coordinator
//!
//! Pairs two WebSocket connections by a shared game id, keeps each player's
//! fleet and guesses, and relays shot results turn by turn until one fleet
//! is sunk.
//!
//! # Architecture
//!
//! - **Games**: grid, turn ownership and shot resolution
//! - **Codec**: text frame protocol
//! - **Session**: registry of live sessions behind a single lock
//! - **Connection**: per-socket receive loop feeding the registry
//! - **Server**: axum router, identity extraction, expiry sweeper
//!
//! # Example
//!
//! ```no_run
//! use strictly_battleship::{GameServer, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = GameServer::new(ServerConfig::default());
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod codec;
mod config;
mod connection;
mod error;
mod games;
mod identity;
mod server;
mod session;

// Crate-level exports - Errors
pub use error::{GameError, ServerError};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Game types
pub use games::battleship::{
    Board, Coordinate, GRID_SIZE, GameId, MoveOutcome, PlayerId, SHIP_CELLS, Shot, TurnState,
    resolve_shot,
};

// Crate-level exports - Wire protocol
pub use codec::{Ending, MoveCommand, MoveReport, Outbound, SetupCommand};

// Crate-level exports - Session management
pub use session::{
    ConnectionToken, Delivery, Outbox, Participant, SessionRegistry, SessionView, dispatch,
};

// Crate-level exports - Transport
pub use connection::{Connection, serve_socket};
pub use identity::{IdentityRejection, PlayerIdentity, USER_HEADER};
pub use server::{GameServer, PLAY_PATH, spawn_sweeper};
