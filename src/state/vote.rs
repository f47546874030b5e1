use crate::protocol::{GameSummary, PublicPlayer};
use crate::state::{AppState, GameError};
use crate::types::*;

/// Outcome of a single elimination
#[derive(Debug, Clone, PartialEq)]
pub struct Elimination {
    pub player: PublicPlayer,
    pub alive_civilians: usize,
    pub alive_undercover: usize,
    /// Present when the elimination ended the game
    pub summary: Option<GameSummary>,
}

/// Winner for the current table, if any.
///
/// Civilians win once no undercover is alive; the undercover win once they
/// are at least as many as the living civilians.
pub fn check_winner(game: &Game) -> Option<Role> {
    let (civilians, undercover) = game.alive_counts();
    if undercover == 0 {
        Some(Role::Civilian)
    } else if undercover >= civilians {
        Some(Role::Undercover)
    } else {
        None
    }
}

impl AppState {
    /// Vote a player out during the discussion
    pub async fn eliminate(&self, player_id: PlayerId) -> Result<Elimination, GameError> {
        let elimination = {
            let mut game = self.game.write().await;
            if game.phase != GamePhase::Discussion {
                return Err(GameError::WrongPhase {
                    action: "eliminate a player",
                    phase: game.phase,
                });
            }

            let player = game
                .players
                .iter_mut()
                .find(|p| p.id == player_id)
                .ok_or(GameError::PlayerNotFound(player_id))?;
            if !player.is_alive {
                return Err(GameError::PlayerAlreadyEliminated(player_id));
            }
            player.is_alive = false;
            player.is_revealed = true;
            let public = PublicPlayer::from(&*player);
            game.version += 1;

            let (alive_civilians, alive_undercover) = game.alive_counts();
            let summary = match check_winner(&game) {
                Some(winner) => {
                    Self::ensure_transition(&game, GamePhase::GameOver, "end the game")?;
                    game.phase = GamePhase::GameOver;
                    game.winner = Some(winner);
                    tracing::info!("Game {} won by {:?}", game.id, winner);
                    game.words.clone().map(|words| GameSummary {
                        winner,
                        words,
                        players: game.players.clone(),
                    })
                }
                None => None,
            };

            Elimination {
                player: public,
                alive_civilians,
                alive_undercover,
                summary,
            }
        };

        if elimination.summary.is_some() {
            self.broadcast_phase_change().await;
        }
        Ok(elimination)
    }

    /// Winner summary of a finished game
    pub async fn summary(&self) -> Option<GameSummary> {
        let game = self.game.read().await;
        let winner = game.winner?;
        Some(GameSummary {
            winner,
            words: game.words.clone()?,
            players: game.players.clone(),
        })
    }
}
