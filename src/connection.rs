//! Per-connection receive loop.
//!
//! A [`Connection`] owns one participant's session for as long as its socket
//! stays open. Frames are routed to setup or move depending on whether the
//! identity already has a session; rejected frames are answered with an
//! error frame and the loop carries on.

use crate::codec::{MoveCommand, Outbound, SetupCommand};
use crate::error::GameError;
use crate::games::battleship::PlayerId;
use crate::session::{ConnectionToken, Outbox, Participant, SessionRegistry, dispatch};
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// One participant's link to the registry.
#[derive(Debug)]
pub struct Connection {
    participant: Participant,
    registry: SessionRegistry,
}

impl Connection {
    /// Binds an identity and its outbound queue to the registry.
    #[instrument(skip(registry, outbox))]
    pub fn open(id: PlayerId, registry: SessionRegistry, outbox: Outbox) -> Self {
        let participant = Participant::new(id, ConnectionToken::next(), outbox);
        debug!(connection = %participant.connection, "Connection opened");
        Self {
            participant,
            registry,
        }
    }

    /// The participant this connection speaks for.
    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    /// Decodes and applies one inbound text frame.
    ///
    /// The first frame (or the first after a finished game) must be a setup
    /// frame; everything after that is a move. On error the sender gets an
    /// `error;<reason>` frame and no session state changes.
    #[instrument(skip(self), fields(player = %self.participant.id))]
    pub fn handle_frame(&self, frame: &str) -> Result<(), GameError> {
        let id = self.participant.id;
        let result = if self.registry.has_session(id) {
            frame
                .parse::<MoveCommand>()
                .and_then(|mv| self.registry.apply_move(id, mv.target))
        } else {
            frame
                .parse::<SetupCommand>()
                .and_then(|setup| self.registry.create_session(&self.participant, setup))
        };

        match result {
            Ok(deliveries) => {
                dispatch(deliveries);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Frame rejected");
                if self
                    .participant
                    .outbox
                    .send(Outbound::Rejected(e.clone()))
                    .is_err()
                {
                    debug!("Writer gone, rejection not delivered");
                }
                Err(e)
            }
        }
    }

    /// Releases this connection's session and notifies a paired opponent.
    #[instrument(skip(self), fields(player = %self.participant.id))]
    pub fn close(self) {
        let deliveries = self
            .registry
            .disconnect(self.participant.id, self.participant.connection);
        dispatch(deliveries);
        debug!("Connection closed");
    }
}

/// Drives an upgraded WebSocket until the peer goes away.
///
/// Outbound frames are written by a separate task fed from the
/// participant's queue, so a slow or dead peer never blocks the registry.
#[instrument(skip(socket, registry))]
pub async fn serve_socket(socket: WebSocket, id: PlayerId, registry: SessionRegistry) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<Outbound>();
    let connection = Connection::open(id, registry, outbox);
    info!("Player connected");

    let writer = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            if let Err(e) = sink.send(Message::Text(message.to_string().into())).await {
                debug!(error = %e, "Write failed, stopping writer");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Err(e) = connection.handle_frame(text.as_str()) {
                    debug!(error = %e, "Continuing after rejected frame");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(other) => debug!(frame = ?other, "Ignoring non-text frame"),
            Err(e) => {
                debug!(error = %e, "Read failed");
                break;
            }
        }
    }

    connection.close();
    writer.abort();
    info!("Player disconnected");
}
