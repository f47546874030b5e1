//! Previously used words, so consecutive games avoid repeats.

use crate::types::WordPair;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// How many of the most recent entries are consulted per selection
pub const HISTORY_WINDOW: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ordered record of used words, oldest first.
///
/// Raw words are stored; comparisons normalize on the fly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn record<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.extend(words.into_iter().map(Into::into));
    }

    /// Record both words of a pair
    pub fn record_pair(&mut self, pair: &WordPair) {
        self.record([pair.civilian_word.as_str(), pair.undercover_word.as_str()]);
    }

    /// The last `limit` entries in chronological order
    pub fn recent(&self, limit: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Persistence slot for the history
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<Vec<String>, HistoryError>;

    fn save(&self, words: &[String]) -> Result<(), HistoryError>;
}

/// Load through `store`, treating a missing or unreadable slot as empty
pub fn load_or_empty(store: &dyn HistoryStore) -> History {
    match store.load() {
        Ok(words) => {
            tracing::info!("Loaded {} history entries", words.len());
            History::from_entries(words)
        }
        Err(e) => {
            tracing::warn!("Ignoring unusable word history: {}", e);
            History::new()
        }
    }
}

/// JSON array on disk, replaced atomically on every save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, words: &[String]) -> Result<(), HistoryError> {
        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer(&mut writer, words)?;
            writer.flush()?;
        }
        temp_file
            .persist(&self.path)
            .map_err(|e| HistoryError::Io(e.error))?;
        Ok(())
    }
}

/// Keeps the history in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    words: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(words: Vec<String>) -> Self {
        Self {
            words: Mutex::new(words),
        }
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        Ok(self
            .words
            .lock()
            .map(|w| w.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, words: &[String]) -> Result<(), HistoryError> {
        match self.words.lock() {
            Ok(mut stored) => *stored = words.to_vec(),
            Err(poisoned) => *poisoned.into_inner() = words.to_vec(),
        }
        Ok(())
    }
}
