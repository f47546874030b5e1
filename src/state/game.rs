use super::{AppState, GameError};
use crate::protocol::{GameView, ServerMessage};
use crate::types::*;

impl AppState {
    /// Get current game
    pub async fn get_game(&self) -> Game {
        self.game.read().await.clone()
    }

    /// Spoiler-free view of the current game
    pub async fn game_view(&self) -> GameView {
        GameView::from(&*self.game.read().await)
    }

    /// Check if a phase transition is valid
    pub(super) fn is_valid_phase_transition(from: GamePhase, to: GamePhase) -> bool {
        use GamePhase::*;

        matches!(
            (from, to),
            (Setup, Loading)
                | (GameOver, Loading)
                | (Loading, Reveal)
                | (Reveal, Discussion)
                | (Discussion, GameOver)
                // Restart; Loading is excluded so a pending selection can finish
                | (Reveal, Setup)
                | (Discussion, Setup)
                | (GameOver, Setup)
                | (Setup, Setup)
        )
    }

    /// Check `to` is reachable from the game's phase
    pub(super) fn ensure_transition(
        game: &Game,
        to: GamePhase,
        action: &'static str,
    ) -> Result<(), GameError> {
        if Self::is_valid_phase_transition(game.phase, to) {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                action,
                phase: game.phase,
            })
        }
    }

    /// Start a new game: select words, record them, deal roles, begin the reveal
    pub async fn start_game(&self, settings: GameSettings) -> Result<Game, GameError> {
        settings.validate()?;

        let game_id = {
            let mut game = self.game.write().await;
            Self::ensure_transition(&game, GamePhase::Loading, "start a game")?;

            game.settings = settings.clone();
            game.phase = GamePhase::Loading;
            game.version += 1;
            game.id.clone()
        };
        self.broadcast_phase_change().await;

        tracing::info!(
            "Starting game {}: {} players, {} undercover, topic {:?}",
            game_id,
            settings.total_players,
            settings.undercover_count,
            settings.topic()
        );

        let pair = self
            .start_selection(settings.topic(), settings.language)
            .await;
        self.record_used(&pair).await;
        let players = self.assign_roles(&settings, &pair);

        let game = {
            let mut game = self.game.write().await;
            game.words = Some(pair);
            game.players = players;
            game.reveal = RevealProgress::default();
            game.winner = None;
            game.started_at = Some(chrono::Utc::now().to_rfc3339());
            game.phase = GamePhase::Reveal;
            game.version += 1;
            game.clone()
        };
        self.broadcast_phase_change().await;

        Ok(game)
    }

    /// Discard players, words and winner; the settings stay for the next game
    pub async fn restart(&self) -> Result<Game, GameError> {
        let game = {
            let mut game = self.game.write().await;
            Self::ensure_transition(&game, GamePhase::Setup, "restart")?;

            let version = game.version + 1;
            *game = Game::new(game.settings.clone());
            game.version = version;
            game.clone()
        };

        tracing::info!("Game restarted as {}", game.id);
        self.broadcast_phase_change().await;
        Ok(game)
    }

    /// Broadcast current phase to all clients
    pub(super) async fn broadcast_phase_change(&self) {
        let game = self.game.read().await;
        self.broadcast_to_all(ServerMessage::Phase {
            phase: game.phase,
            game_id: game.id.clone(),
            server_now: chrono::Utc::now().to_rfc3339(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_two() -> GameSettings {
        GameSettings {
            total_players: 6,
            undercover_count: 2,
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_phase_transitions() {
        use GamePhase::*;

        assert!(AppState::is_valid_phase_transition(Setup, Loading));
        assert!(AppState::is_valid_phase_transition(GameOver, Loading));
        assert!(AppState::is_valid_phase_transition(Reveal, Discussion));
        assert!(AppState::is_valid_phase_transition(Discussion, Setup));

        assert!(!AppState::is_valid_phase_transition(Reveal, Loading));
        assert!(!AppState::is_valid_phase_transition(Setup, Discussion));
        assert!(!AppState::is_valid_phase_transition(Loading, Setup));
    }

    #[tokio::test]
    async fn test_start_game_deals_roles() {
        let state = AppState::new();

        let game = state.start_game(six_two()).await.unwrap();

        assert_eq!(game.phase, GamePhase::Reveal);
        assert_eq!(game.players.len(), 6);
        assert_eq!(game.reveal, RevealProgress::default());
        assert!(game.started_at.is_some());
        let words = game.words.clone().unwrap();
        assert!(words.is_valid());
        assert_eq!(
            state.get_history().await,
            vec![words.civilian_word, words.undercover_word]
        );
        let (civilians, undercover) = game.alive_counts();
        assert_eq!((civilians, undercover), (4, 2));
    }

    #[tokio::test]
    async fn test_start_game_rejects_bad_settings() {
        let state = AppState::new();
        let settings = GameSettings {
            total_players: 4,
            undercover_count: 2,
            ..GameSettings::default()
        };

        let err = state.start_game(settings).await.unwrap_err();

        assert_eq!(err.code(), "INVALID_SETTINGS");
        assert_eq!(state.get_game().await.phase, GamePhase::Setup);
        assert!(state.get_history().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_game_twice_is_refused() {
        let state = AppState::new();
        state.start_game(six_two()).await.unwrap();

        let err = state.start_game(six_two()).await.unwrap_err();

        assert_eq!(
            err,
            GameError::WrongPhase {
                action: "start a game",
                phase: GamePhase::Reveal
            }
        );
    }

    #[tokio::test]
    async fn test_restart_keeps_settings() {
        let state = AppState::new();
        let started = state.start_game(six_two()).await.unwrap();

        let game = state.restart().await.unwrap();

        assert_eq!(game.phase, GamePhase::Setup);
        assert_eq!(game.settings, six_two());
        assert!(game.players.is_empty());
        assert!(game.words.is_none());
        assert_ne!(game.id, started.id);
        assert!(game.version > started.version);
    }

    #[tokio::test]
    async fn test_phase_changes_are_broadcast() {
        let state = AppState::new();
        let mut rx = state.broadcast.subscribe();

        state.start_game(six_two()).await.unwrap();

        let mut phases = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let ServerMessage::Phase { phase, .. } = msg {
                phases.push(phase);
            }
        }
        assert_eq!(phases, vec![GamePhase::Loading, GamePhase::Reveal]);
    }
}
