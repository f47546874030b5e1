use super::{AppState, GameError};
use crate::protocol::RevealCard;
use crate::types::*;

impl AppState {
    fn ensure_revealing(game: &Game, action: &'static str) -> Result<(), GameError> {
        if game.phase == GamePhase::Reveal {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                action,
                phase: game.phase,
            })
        }
    }

    fn reveal_card(game: &Game) -> Option<RevealCard> {
        let player = game.players.get(game.reveal.index)?;
        Some(RevealCard {
            player_id: player.id,
            index: game.reveal.index,
            total: game.players.len(),
            word: game.reveal.showing.then(|| player.word.clone()),
        })
    }

    /// Card for whoever currently holds the device, word hidden unless peeked
    pub async fn current_card(&self) -> Result<RevealCard, GameError> {
        let game = self.game.read().await;
        Self::ensure_revealing(&game, "show the reveal card")?;
        Self::reveal_card(&game).ok_or(GameError::WrongPhase {
            action: "show the reveal card",
            phase: game.phase,
        })
    }

    /// Show the current player's word
    pub async fn peek_word(&self) -> Result<RevealCard, GameError> {
        let mut game = self.game.write().await;
        Self::ensure_revealing(&game, "peek at a word")?;

        game.reveal.showing = true;
        Self::reveal_card(&game).ok_or(GameError::WrongPhase {
            action: "peek at a word",
            phase: game.phase,
        })
    }

    /// Hide the word and hand over to the next player.
    ///
    /// Returns the next (hidden) card, or `None` once everybody has seen their
    /// word and the game has moved on to the discussion.
    pub async fn next_reveal(&self) -> Result<Option<RevealCard>, GameError> {
        let card = {
            let mut game = self.game.write().await;
            Self::ensure_revealing(&game, "advance the reveal")?;

            game.reveal.showing = false;
            if game.reveal.index + 1 < game.players.len() {
                game.reveal.index += 1;
                game.version += 1;
                return Ok(Self::reveal_card(&game));
            }

            Self::ensure_transition(&game, GamePhase::Discussion, "advance the reveal")?;
            game.phase = GamePhase::Discussion;
            game.version += 1;
            None
        };

        tracing::info!("All words revealed, discussion starts");
        self.broadcast_phase_change().await;
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn revealing(total_players: u32) -> AppState {
        let state = AppState::new();
        state
            .start_game(GameSettings {
                total_players,
                ..GameSettings::default()
            })
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn test_peek_shows_own_word() {
        let state = revealing(3).await;
        let game = state.get_game().await;

        let hidden = state.current_card().await.unwrap();
        assert_eq!(hidden.word, None);
        assert_eq!(hidden.player_id, 1);

        let card = state.peek_word().await.unwrap();
        assert_eq!(card.index, 0);
        assert_eq!(card.total, 3);
        assert_eq!(card.word.as_deref(), Some(game.players[0].word.as_str()));
    }

    #[tokio::test]
    async fn test_next_reveal_walks_the_table() {
        let state = revealing(3).await;

        state.peek_word().await.unwrap();
        let second = state.next_reveal().await.unwrap().unwrap();
        assert_eq!(second.player_id, 2);
        assert_eq!(second.word, None);

        let third = state.next_reveal().await.unwrap().unwrap();
        assert_eq!(third.player_id, 3);

        assert_eq!(state.next_reveal().await.unwrap(), None);
        assert_eq!(state.get_game().await.phase, GamePhase::Discussion);
    }

    #[tokio::test]
    async fn test_reveal_outside_reveal_phase() {
        let state = AppState::new();

        let err = state.peek_word().await.unwrap_err();
        assert_eq!(err.code(), "WRONG_PHASE");
        assert!(state.next_reveal().await.is_err());
        assert!(state.current_card().await.is_err());
    }
}
