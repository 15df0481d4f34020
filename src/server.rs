//! HTTP entry point: upgrades `/game/play` to a WebSocket per player.

use crate::config::ServerConfig;
use crate::connection::serve_socket;
use crate::error::ServerError;
use crate::identity::PlayerIdentity;
use crate::session::{SessionRegistry, dispatch};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::Response;
use axum::routing::get;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Path players connect to.
pub const PLAY_PATH: &str = "/game/play";

/// The coordinator: configuration plus the shared session registry.
#[derive(Debug, Clone)]
pub struct GameServer {
    config: ServerConfig,
    registry: SessionRegistry,
}

impl GameServer {
    /// Creates a server with a fresh registry.
    #[instrument(skip(config))]
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, SessionRegistry::new())
    }

    /// Creates a server around an existing registry.
    #[instrument(skip(config, registry))]
    pub fn with_registry(config: ServerConfig, registry: SessionRegistry) -> Self {
        info!("Creating game server");
        Self { config, registry }
    }

    /// The registry backing this server.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Routes served by the coordinator.
    pub fn router(&self) -> Router {
        Router::new()
            .route(PLAY_PATH, get(play))
            .with_state(self.registry.clone())
    }

    /// Binds the configured listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the address cannot be bound.
    #[instrument(skip(self))]
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.socket_addr();
        TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::new(format!("Failed to bind {}: {}", addr, e)))
    }

    /// Serves players on an already bound listener until the process exits.
    #[instrument(skip_all)]
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let sweeper = self
            .config
            .waiting_timeout()
            .map(|max_wait| spawn_sweeper(self.registry.clone(), max_wait, self.config.sweep_interval()));

        info!(addr = %listener.local_addr()?, "server is listening");
        let result = axum::serve(listener, self.router()).await;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        result?;
        Ok(())
    }

    /// Binds and serves.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }
}

#[instrument(skip(registry, ws), fields(player = %identity.id()))]
async fn play(
    State(registry): State<SessionRegistry>,
    identity: PlayerIdentity,
    ws: WebSocketUpgrade,
) -> Response {
    debug!("Upgrading to WebSocket");
    let id = identity.id();
    ws.on_upgrade(move |socket| serve_socket(socket, id, registry))
}

/// Periodically expires players still waiting for an opponent.
pub fn spawn_sweeper(
    registry: SessionRegistry,
    max_wait: Duration,
    every: Duration,
) -> JoinHandle<()> {
    info!(?max_wait, ?every, "Starting waiting-player sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            dispatch(registry.sweep_waiting(max_wait));
        }
    })
}
