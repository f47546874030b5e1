use serde::{Deserialize, Serialize};

use crate::words::normalize;

/// Opaque ID types for type safety
pub type GameId = String;
pub type PlayerId = u32;

/// Bounds of the settings contract
pub const MIN_PLAYERS: u32 = 3;
pub const MAX_PLAYERS: u32 = 12;
pub const MIN_UNDERCOVER: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Setup,
    Loading,
    Reveal,
    Discussion,
    GameOver,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

/// How generated words are cased before they reach players
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// Upper-case the first character, leave the rest untouched
    Capitalize,
    /// Scripts without case use the text as-is
    Verbatim,
}

impl Casing {
    pub fn apply(self, word: &str) -> String {
        match self {
            Casing::Capitalize => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            Casing::Verbatim => word.to_string(),
        }
    }
}

impl Language {
    pub fn casing(self) -> Casing {
        match self {
            Language::En => Casing::Capitalize,
            Language::Zh => Casing::Verbatim,
        }
    }

    /// Instruction telling the model which language to answer in
    pub fn instruction(self) -> &'static str {
        match self {
            Language::En => "Generate the words in English.",
            Language::Zh => "Generate the words in Simplified Chinese (Mandarin).",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordPair {
    pub civilian_word: String,
    pub undercover_word: String,
}

impl WordPair {
    pub fn new(civilian_word: impl Into<String>, undercover_word: impl Into<String>) -> Self {
        Self {
            civilian_word: civilian_word.into(),
            undercover_word: undercover_word.into(),
        }
    }

    /// Both words present and distinct once normalized
    pub fn is_valid(&self) -> bool {
        let civilian = normalize(&self.civilian_word);
        let undercover = normalize(&self.undercover_word);
        !civilian.is_empty() && !undercover.is_empty() && civilian != undercover
    }

    /// Apply a casing policy to both words
    pub fn cased(&self, casing: Casing) -> Self {
        Self {
            civilian_word: casing.apply(&self.civilian_word),
            undercover_word: casing.apply(&self.undercover_word),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Civilian,
    Undercover,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub role: Role,
    pub word: String,
    pub is_alive: bool,
    /// Set once the player's identity is public (elimination)
    pub is_revealed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub total_players: u32,
    pub undercover_count: u32,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub language: Language,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            total_players: 4,
            undercover_count: 1,
            topic: None,
            language: Language::En,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("total players must be between 3 and 12, got {0}")]
    PlayerCount(u32),

    #[error("undercover count must be between 1 and {max} for {total} players, got {count}")]
    UndercoverCount { count: u32, total: u32, max: u32 },
}

impl GameSettings {
    /// Largest undercover count allowed for a table of `total_players`
    pub fn max_undercover(total_players: u32) -> u32 {
        (total_players / 3).max(MIN_UNDERCOVER)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.total_players) {
            return Err(SettingsError::PlayerCount(self.total_players));
        }

        let max = Self::max_undercover(self.total_players);
        if !(MIN_UNDERCOVER..=max).contains(&self.undercover_count) {
            return Err(SettingsError::UndercoverCount {
                count: self.undercover_count,
                total: self.total_players,
                max,
            });
        }

        Ok(())
    }

    /// Topic with surrounding whitespace removed, `None` when blank
    pub fn topic(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Progress through the pass-the-device word reveal
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RevealProgress {
    /// Index into the player list of whoever holds the device
    pub index: usize,
    /// Whether the current player's word is on screen
    pub showing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub version: u64,
    pub phase: GamePhase,
    pub settings: GameSettings,
    pub words: Option<WordPair>,
    pub players: Vec<Player>,
    pub reveal: RevealProgress,
    pub winner: Option<Role>,
    pub started_at: Option<String>, // ISO timestamp of the last start_game
}

impl Game {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            version: 1,
            phase: GamePhase::Setup,
            settings,
            words: None,
            players: Vec::new(),
            reveal: RevealProgress::default(),
            winner: None,
            started_at: None,
        }
    }

    /// Living players counted per role: (civilians, undercovers)
    pub fn alive_counts(&self) -> (usize, usize) {
        self.players
            .iter()
            .filter(|p| p.is_alive)
            .fold((0, 0), |(civ, spy), p| match p.role {
                Role::Civilian => (civ + 1, spy),
                Role::Undercover => (civ, spy + 1),
            })
    }
}
