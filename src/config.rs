use crate::llm::env_nonempty;
use crate::words::SelectionConfig;
use std::path::PathBuf;

/// Server-level settings; generation vendors live in `LlmConfig`
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub history_path: PathBuf,
    pub selection: SelectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // 6573 is ascii for "AI"
            port: 6573,
            history_path: PathBuf::from("data/history.json"),
            selection: SelectionConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_nonempty("UNDERCOVER_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let history_path = env_nonempty("HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.history_path);

        let attempts = env_nonempty("SELECTION_ATTEMPTS")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.selection.attempts)
            .clamp(1, 4);

        let candidates_per_request = env_nonempty("CANDIDATES_PER_REQUEST")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.selection.candidates_per_request)
            .clamp(1, 10);

        Self {
            port,
            history_path,
            selection: SelectionConfig {
                attempts,
                candidates_per_request,
            },
        }
    }
}
