//! Session registry: pairing, turn-checked moves and eviction.
//!
//! All live sessions sit behind one lock. Every operation runs to completion
//! inside it and hands back the frames to send as [`Delivery`] values, so
//! nothing touches a socket while the lock is held.

use crate::codec::{MoveReport, Outbound, SetupCommand};
use crate::error::GameError;
use crate::games::battleship::{Board, Coordinate, GameId, PlayerId, TurnState, resolve_shot};
use derive_getters::Getters;
use derive_more::Display;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Sending half of a participant's outbound frame queue.
pub type Outbox = mpsc::UnboundedSender<Outbound>;

/// Distinguishes successive connections made under the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("conn-{}", _0)]
pub struct ConnectionToken(u64);

impl ConnectionToken {
    /// Allocates a process-unique token.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A connected participant as seen by the registry.
#[derive(Debug, Clone, derive_new::new)]
pub struct Participant {
    /// Identity resolved by the transport.
    pub id: PlayerId,
    /// Connection this participant is speaking through.
    pub connection: ConnectionToken,
    /// Where frames for this participant go.
    pub outbox: Outbox,
}

/// A frame addressed to one participant, sent after the lock is released.
#[derive(Debug, Clone, derive_new::new)]
pub struct Delivery {
    /// Who receives the frame.
    pub recipient: PlayerId,
    outbox: Outbox,
    /// The frame itself.
    pub message: Outbound,
}

impl Delivery {
    /// Queues the frame. Returns `false` if the recipient's writer is gone.
    pub fn send(self) -> bool {
        self.outbox.send(self.message).is_ok()
    }
}

/// Sends every delivery, continuing past recipients that have gone away.
#[instrument(skip(deliveries), fields(count = deliveries.len()))]
pub fn dispatch(deliveries: Vec<Delivery>) {
    for delivery in deliveries {
        let recipient = delivery.recipient;
        if !delivery.send() {
            warn!(player = %recipient, "Recipient writer closed, frame dropped");
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    game_id: GameId,
    fleet: Board,
    shots: Board,
    turn: TurnState,
    outbox: Outbox,
    connection: ConnectionToken,
    created_at: Instant,
}

/// Read-only copy of one participant's session.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SessionView {
    /// Game the participant joined.
    game_id: GameId,
    /// Pairing and turn ownership.
    turn: TurnState,
    /// The participant's own ships.
    fleet: Board,
    /// Cells the participant has fired at.
    shots: Board,
}

impl From<&SessionEntry> for SessionView {
    fn from(entry: &SessionEntry) -> Self {
        Self {
            game_id: entry.game_id.clone(),
            turn: entry.turn,
            fleet: entry.fleet,
            shots: entry.shots,
        }
    }
}

/// Occupancy of one game identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameSlot {
    Waiting(PlayerId),
    Playing(PlayerId, PlayerId),
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<PlayerId, SessionEntry>,
    games: HashMap<GameId, GameSlot>,
}

impl RegistryState {
    /// Removes one entry and releases its game slot.
    fn remove_entry(&mut self, id: PlayerId) -> Option<SessionEntry> {
        let entry = self.entries.remove(&id)?;
        let releases = match self.games.get(&entry.game_id) {
            Some(GameSlot::Waiting(waiter)) => *waiter == id,
            Some(GameSlot::Playing(a, b)) => *a == id || *b == id,
            None => false,
        };
        if releases {
            self.games.remove(&entry.game_id);
        }
        Some(entry)
    }
}

/// Process-wide map from identity to live session.
///
/// Cloning shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session registry");
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Session registry lock poisoned, continuing with inner state");
            poisoned.into_inner()
        })
    }

    /// Whether the identity already has a session.
    pub fn has_session(&self, id: PlayerId) -> bool {
        self.lock().entries.contains_key(&id)
    }

    /// Number of live session entries.
    pub fn session_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Copies out the session for an identity, if one exists.
    pub fn snapshot(&self, id: PlayerId) -> Option<SessionView> {
        self.lock().entries.get(&id).map(SessionView::from)
    }

    /// Registers a participant's fleet and pairs them if someone is
    /// already waiting on the same game id.
    ///
    /// The participant who was waiting fires first. When pairing completes
    /// both sides receive a turn notice.
    ///
    /// # Errors
    ///
    /// - [`GameError::AlreadyInSession`] if the identity has an entry.
    /// - [`GameError::GameIdentifierConflict`] if two players already hold
    ///   the game id.
    #[instrument(skip(self, participant, setup), fields(player = %participant.id, game = %setup.game_id))]
    pub fn create_session(
        &self,
        participant: &Participant,
        setup: SetupCommand,
    ) -> Result<Vec<Delivery>, GameError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let id = participant.id;

        if state.entries.contains_key(&id) {
            warn!("Setup from a player who already has a session");
            return Err(GameError::AlreadyInSession);
        }

        let SetupCommand { game_id, fleet } = setup;

        let partner = match state.games.get(&game_id).copied() {
            Some(GameSlot::Playing(a, b)) => {
                warn!(first = %a, second = %b, "Game id already in play");
                return Err(GameError::GameIdentifierConflict(game_id.to_string()));
            }
            Some(GameSlot::Waiting(waiter_id)) => match state.entries.get_mut(&waiter_id) {
                Some(waiter) if waiter.turn == TurnState::AwaitingOpponent => {
                    waiter.turn = TurnState::pair_first(id);
                    Some((waiter_id, waiter.outbox.clone()))
                }
                _ => {
                    error!(waiter = %waiter_id, "Waiting slot has no waiting entry, replacing it");
                    None
                }
            },
            None => None,
        };

        let mut entry = SessionEntry {
            game_id: game_id.clone(),
            fleet,
            shots: Board::new(),
            turn: TurnState::AwaitingOpponent,
            outbox: participant.outbox.clone(),
            connection: participant.connection,
            created_at: Instant::now(),
        };

        match partner {
            Some((waiter_id, waiter_outbox)) => {
                entry.turn = TurnState::pair_second(waiter_id);
                state.entries.insert(id, entry);
                state
                    .games
                    .insert(game_id, GameSlot::Playing(waiter_id, id));
                info!(opponent = %waiter_id, "Players paired");
                Ok(vec![
                    Delivery::new(waiter_id, waiter_outbox, Outbound::YourTurn),
                    Delivery::new(id, participant.outbox.clone(), Outbound::OpponentsTurn),
                ])
            }
            None => {
                state.entries.insert(id, entry);
                state.games.insert(game_id, GameSlot::Waiting(id));
                info!("Waiting for opponent");
                Ok(Vec::new())
            }
        }
    }

    /// Fires at `target` on behalf of `id`.
    ///
    /// On success the turn passes to the opponent and both sides get a
    /// result frame. If the shot sinks the last ship cell, both entries are
    /// evicted before the lock is released.
    ///
    /// # Errors
    ///
    /// - [`GameError::NoSession`] if the identity has no entry.
    /// - [`GameError::NoOpponent`] before pairing.
    /// - [`GameError::NotYourTurn`] while the opponent holds the turn.
    /// - [`GameError::BrokenPairing`] if the opponent entry is inconsistent.
    ///
    /// No state changes on error.
    #[instrument(skip_all, fields(player = %id, cell = %target))]
    pub fn apply_move(&self, id: PlayerId, target: Coordinate) -> Result<Vec<Delivery>, GameError> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let entry = state.entries.get(&id).ok_or(GameError::NoSession)?;
        let opponent = match entry.turn {
            TurnState::AwaitingOpponent => return Err(GameError::NoOpponent),
            TurnState::WaitingTurn { .. } => return Err(GameError::NotYourTurn),
            TurnState::ActiveTurn { opponent } => opponent,
        };

        let fleet = match state.entries.get(&opponent) {
            Some(defender) if defender.turn == TurnState::pair_second(id) => defender.fleet,
            other => {
                error!(
                    opponent = %opponent,
                    opponent_state = ?other.map(|d| d.turn),
                    "Opponent entry does not mirror this session"
                );
                return Err(GameError::BrokenPairing);
            }
        };

        let (outcome, attacker_outbox) = {
            let attacker = state.entries.get_mut(&id).ok_or(GameError::NoSession)?;
            let outcome = resolve_shot(&mut attacker.shots, &fleet, target);
            attacker.turn = attacker.turn.pass();
            (outcome, attacker.outbox.clone())
        };
        let defender_outbox = {
            let defender = state
                .entries
                .get_mut(&opponent)
                .ok_or(GameError::BrokenPairing)?;
            defender.turn = defender.turn.take();
            defender.outbox.clone()
        };

        debug!(shot = %outcome.shot, finished = outcome.finished, "Shot resolved");

        if outcome.finished {
            state.remove_entry(id);
            state.remove_entry(opponent);
            info!(winner = %id, loser = %opponent, "Game finished");
        }

        Ok(vec![
            Delivery::new(
                id,
                attacker_outbox,
                Outbound::Report(MoveReport::for_attacker(&outcome)),
            ),
            Delivery::new(
                opponent,
                defender_outbox,
                Outbound::Report(MoveReport::for_defender(&outcome)),
            ),
        ])
    }

    /// Evicts a single entry. Returns whether one existed.
    ///
    /// A paired opponent is left untouched; use [`Self::remove_pair`] to end
    /// a game for both sides.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: PlayerId) -> bool {
        let removed = self.lock().remove_entry(id).is_some();
        debug!(removed, "Session removed");
        removed
    }

    /// Evicts both sides of a game.
    #[instrument(skip(self))]
    pub fn remove_pair(&self, a: PlayerId, b: PlayerId) {
        let mut state = self.lock();
        state.remove_entry(a);
        state.remove_entry(b);
        debug!("Pair removed");
    }

    /// Cleans up after a dropped connection.
    ///
    /// Only the entry created through `connection` is touched, so a stale
    /// socket closing cannot tear down a newer connection's game. A paired
    /// opponent is evicted as well and told that the game is over.
    #[instrument(skip(self))]
    pub fn disconnect(&self, id: PlayerId, connection: ConnectionToken) -> Vec<Delivery> {
        let mut state = self.lock();

        let opponent = match state.entries.get(&id) {
            Some(entry) if entry.connection == connection => entry.turn.opponent(),
            Some(_) => {
                debug!("Session belongs to another connection, leaving it");
                return Vec::new();
            }
            None => return Vec::new(),
        };

        state.remove_entry(id);
        info!(opponent = ?opponent, "Player disconnected, session released");

        opponent
            .and_then(|opponent| state.remove_entry(opponent).map(|entry| (opponent, entry)))
            .map(|(opponent, entry)| Delivery::new(opponent, entry.outbox, Outbound::OpponentLeft))
            .into_iter()
            .collect()
    }

    /// Evicts participants that have waited for an opponent at least
    /// `max_wait`, telling each that their game expired.
    #[instrument(skip(self))]
    pub fn sweep_waiting(&self, max_wait: Duration) -> Vec<Delivery> {
        let mut state = self.lock();
        let stale: Vec<PlayerId> = state
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry.turn == TurnState::AwaitingOpponent && entry.created_at.elapsed() >= max_wait
            })
            .map(|(id, _)| *id)
            .collect();

        let expired: Vec<Delivery> = stale
            .into_iter()
            .filter_map(|id| state.remove_entry(id).map(|entry| (id, entry)))
            .map(|(id, entry)| Delivery::new(id, entry.outbox, Outbound::Expired))
            .collect();

        if !expired.is_empty() {
            info!(count = expired.len(), "Expired players waiting for an opponent");
        }
        expired
    }
}
