use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    StartGame {
        settings: GameSettings,
    },
    /// Show the word of whoever holds the device
    PeekWord,
    /// Hide the word and pass the device on
    NextReveal,
    Eliminate {
        player_id: PlayerId,
    },
    Restart,
    GetHistory,
    ClearHistory,
    GetState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        game: GameView,
        server_now: String,
    },
    Phase {
        phase: GamePhase,
        game_id: GameId,
        server_now: String,
    },
    RevealCard {
        card: RevealCard,
    },
    /// Reveal finished, the table starts describing
    Discussion {
        players: Vec<PublicPlayer>,
    },
    Eliminated {
        player: PublicPlayer,
        alive_civilians: usize,
        alive_undercover: usize,
    },
    GameOver {
        summary: GameSummary,
    },
    History {
        words: Vec<String>,
    },
    HistoryCleared,
    GameState {
        game: GameView,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// What the shared screen may show about a player.
/// The role stays hidden until the player is revealed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub is_alive: bool,
    pub is_revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl From<&Player> for PublicPlayer {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            is_alive: p.is_alive,
            is_revealed: p.is_revealed,
            role: p.is_revealed.then_some(p.role),
        }
    }
}

/// Pass-the-device card for the current player; `word` only after a peek
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevealCard {
    pub player_id: PlayerId,
    pub index: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

/// Everything that becomes public once a winner is known
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub winner: Role,
    pub words: WordPair,
    pub players: Vec<Player>,
}

/// Spoiler-free snapshot of the game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: GameId,
    pub version: u64,
    pub phase: GamePhase,
    pub settings: GameSettings,
    pub players: Vec<PublicPlayer>,
    pub reveal_index: usize,
    pub winner: Option<Role>,
    /// Only filled once the game is over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<WordPair>,
    pub started_at: Option<String>,
}

impl From<&Game> for GameView {
    fn from(g: &Game) -> Self {
        Self {
            id: g.id.clone(),
            version: g.version,
            phase: g.phase,
            settings: g.settings.clone(),
            players: g.players.iter().map(PublicPlayer::from).collect(),
            reveal_index: g.reveal.index,
            winner: g.winner,
            words: if g.phase == GamePhase::GameOver {
                g.words.clone()
            } else {
                None
            },
            started_at: g.started_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(role: Role, is_revealed: bool) -> Player {
        Player {
            id: 3,
            role,
            word: "Tea".to_string(),
            is_alive: !is_revealed,
            is_revealed,
        }
    }

    #[test]
    fn test_client_message_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"eliminate","player_id":2}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Eliminate { player_id: 2 }));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"t":"start_game","settings":{"totalPlayers":6,"undercoverCount":2}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::StartGame { settings } => {
                assert_eq!(settings.total_players, 6);
                assert_eq!(settings.language, Language::En);
                assert_eq!(settings.topic, None);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_public_player_hides_role_and_word() {
        let hidden = serde_json::to_value(PublicPlayer::from(&player(Role::Undercover, false)))
            .unwrap();
        assert!(hidden.get("role").is_none());
        assert!(hidden.get("word").is_none());

        let revealed = PublicPlayer::from(&player(Role::Undercover, true));
        assert_eq!(revealed.role, Some(Role::Undercover));
    }

    #[test]
    fn test_game_view_hides_words_until_game_over() {
        let mut game = Game::new(GameSettings::default());
        game.phase = GamePhase::Discussion;
        game.words = Some(WordPair::new("Coffee", "Tea"));
        game.players = vec![player(Role::Civilian, false)];

        let view = GameView::from(&game);
        assert!(view.words.is_none());
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("Coffee"));
        assert!(!json.contains("Tea"));

        game.phase = GamePhase::GameOver;
        assert_eq!(GameView::from(&game).words, Some(WordPair::new("Coffee", "Tea")));
    }

    #[test]
    fn test_error_wire_format() {
        let json = serde_json::to_value(ServerMessage::Error {
            code: "WRONG_PHASE".to_string(),
            msg: "nope".to_string(),
        })
        .unwrap();
        assert_eq!(json["t"], "error");
        assert_eq!(json["code"], "WRONG_PHASE");
    }
}
