mod game;
mod reveal;
mod vote;
mod words;

pub use vote::{check_winner, Elimination};

use crate::history::{load_or_empty, History, HistoryStore, MemoryStore};
use crate::protocol::ServerMessage;
use crate::types::*;
use crate::words::{CandidateGenerator, SelectionConfig};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

/// Why a game action was refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error("cannot {action} while the game is in {phase:?}")]
    WrongPhase {
        action: &'static str,
        phase: GamePhase,
    },

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {0} is already eliminated")]
    PlayerAlreadyEliminated(PlayerId),
}

impl GameError {
    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidSettings(_) => "INVALID_SETTINGS",
            GameError::WrongPhase { .. } => "WRONG_PHASE",
            GameError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            GameError::PlayerAlreadyEliminated(_) => "PLAYER_ALREADY_ELIMINATED",
        }
    }
}

impl From<GameError> for ServerMessage {
    fn from(e: GameError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<RwLock<Game>>,
    pub history: Arc<RwLock<History>>,
    history_store: Arc<dyn HistoryStore>,
    /// Serializes disk writes so an older snapshot never lands last
    persist_lock: Arc<Mutex<()>>,
    pub generator: Arc<CandidateGenerator>,
    pub selection: SelectionConfig,
    /// Broadcast channel for sending messages to every connected client
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    /// Offline state: no generation service, history kept in memory
    pub fn new() -> Self {
        Self::with_parts(
            CandidateGenerator::disabled(),
            Arc::new(MemoryStore::new()),
            SelectionConfig::default(),
        )
    }

    /// Build the state around explicit collaborators, loading the history
    /// from `history_store`
    pub fn with_parts(
        generator: CandidateGenerator,
        history_store: Arc<dyn HistoryStore>,
        selection: SelectionConfig,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        let history = load_or_empty(history_store.as_ref());

        Self {
            game: Arc::new(RwLock::new(Game::new(GameSettings::default()))),
            history: Arc::new(RwLock::new(history)),
            history_store,
            persist_lock: Arc::new(Mutex::new(())),
            generator: Arc::new(generator),
            selection,
            broadcast: tx,
        }
    }

    /// Send to every open socket; no receivers is fine
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        let _ = self.broadcast.send(msg);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_state_starts_in_setup() {
        let state = AppState::new();
        let game = state.get_game().await;

        assert_eq!(game.phase, GamePhase::Setup);
        assert_eq!(game.settings, GameSettings::default());
        assert!(game.players.is_empty());
        assert!(state.get_history().await.is_empty());
        assert!(!state.generator.is_available());
    }

    #[tokio::test]
    async fn test_history_is_loaded_from_store() {
        let store = Arc::new(MemoryStore::with_words(vec![
            "Coffee".to_string(),
            "Tea".to_string(),
        ]));
        let state = AppState::with_parts(
            CandidateGenerator::disabled(),
            store,
            SelectionConfig::default(),
        );

        assert_eq!(state.get_history().await, vec!["Coffee", "Tea"]);
    }

    #[test]
    fn test_error_codes() {
        let wrong_phase = GameError::WrongPhase {
            action: "peek",
            phase: GamePhase::Setup,
        };
        assert_eq!(wrong_phase.code(), "WRONG_PHASE");
        assert_eq!(GameError::PlayerNotFound(9).code(), "PLAYER_NOT_FOUND");

        match ServerMessage::from(GameError::PlayerAlreadyEliminated(2)) {
            ServerMessage::Error { code, msg } => {
                assert_eq!(code, "PLAYER_ALREADY_ELIMINATED");
                assert_eq!(msg, "player 2 is already eliminated");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let state = AppState::new();
        let mut rx = state.broadcast.subscribe();

        state.broadcast_to_all(ServerMessage::HistoryCleared);

        assert!(matches!(rx.recv().await, Ok(ServerMessage::HistoryCleared)));
    }
}
