//! WebSocket message dispatch
//!
//! Single entry point for client messages. Every connected device is a
//! table device, so there is no role check; state methods enforce phases.

use crate::protocol::{ClientMessage, PublicPlayer, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    match msg {
        ClientMessage::StartGame { settings } => match state.start_game(settings).await {
            Ok(_) => state
                .current_card()
                .await
                .map(|card| ServerMessage::RevealCard { card })
                .ok(),
            Err(e) => Some(e.into()),
        },

        ClientMessage::PeekWord => Some(match state.peek_word().await {
            Ok(card) => ServerMessage::RevealCard { card },
            Err(e) => e.into(),
        }),

        ClientMessage::NextReveal => Some(match state.next_reveal().await {
            Ok(Some(card)) => ServerMessage::RevealCard { card },
            Ok(None) => {
                let game = state.get_game().await;
                ServerMessage::Discussion {
                    players: game.players.iter().map(PublicPlayer::from).collect(),
                }
            }
            Err(e) => e.into(),
        }),

        ClientMessage::Eliminate { player_id } => Some(match state.eliminate(player_id).await {
            Ok(elimination) => match elimination.summary {
                Some(summary) => ServerMessage::GameOver { summary },
                None => ServerMessage::Eliminated {
                    player: elimination.player,
                    alive_civilians: elimination.alive_civilians,
                    alive_undercover: elimination.alive_undercover,
                },
            },
            Err(e) => e.into(),
        }),

        ClientMessage::Restart => Some(match state.restart().await {
            Ok(game) => ServerMessage::GameState {
                game: (&game).into(),
            },
            Err(e) => e.into(),
        }),

        ClientMessage::GetHistory => Some(ServerMessage::History {
            words: state.get_history().await,
        }),

        ClientMessage::ClearHistory => {
            state.clear_history().await;
            Some(ServerMessage::HistoryCleared)
        }

        ClientMessage::GetState => Some(match state.summary().await {
            Some(summary) => ServerMessage::GameOver { summary },
            None => ServerMessage::GameState {
                game: state.game_view().await,
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GamePhase, GameSettings};

    #[tokio::test]
    async fn test_start_game_answers_with_hidden_card() {
        let state = Arc::new(AppState::new());

        let response = handle_message(
            ClientMessage::StartGame {
                settings: GameSettings::default(),
            },
            &state,
        )
        .await;

        match response {
            Some(ServerMessage::RevealCard { card }) => {
                assert_eq!(card.player_id, 1);
                assert_eq!(card.total, 4);
                assert!(card.word.is_none());
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_errors_carry_codes() {
        let state = Arc::new(AppState::new());

        let response = handle_message(ClientMessage::Eliminate { player_id: 1 }, &state).await;

        match response {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "WRONG_PHASE"),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_state_in_setup() {
        let state = Arc::new(AppState::new());

        match handle_message(ClientMessage::GetState, &state).await {
            Some(ServerMessage::GameState { game }) => {
                assert_eq!(game.phase, GamePhase::Setup);
                assert!(game.players.is_empty());
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
