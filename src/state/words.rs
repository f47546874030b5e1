use super::AppState;
use crate::history::HISTORY_WINDOW;
use crate::roles;
use crate::types::*;

impl AppState {
    /// Pick the pair for a new game against the current history
    pub async fn start_selection(&self, topic: Option<&str>, language: Language) -> WordPair {
        // Snapshot so no lock is held across generation
        let snapshot = self.history.read().await.recent(HISTORY_WINDOW).to_vec();

        crate::words::start_selection(
            &self.generator,
            &self.selection,
            topic,
            language,
            &snapshot,
        )
        .await
    }

    pub fn assign_roles(&self, settings: &GameSettings, pair: &WordPair) -> Vec<Player> {
        roles::assign(settings, pair)
    }

    /// Remember both words of `pair` and persist the history
    pub async fn record_used(&self, pair: &WordPair) {
        let _persist = self.persist_lock.lock().await;
        let entries = {
            let mut history = self.history.write().await;
            history.record_pair(pair);
            history.entries().to_vec()
        };
        self.persist_history(entries).await;
    }

    pub async fn clear_history(&self) {
        let _persist = self.persist_lock.lock().await;
        self.history.write().await.clear();
        self.persist_history(Vec::new()).await;
        tracing::info!("Word history cleared");
    }

    pub async fn get_history(&self) -> Vec<String> {
        self.history.read().await.entries().to_vec()
    }

    /// Write `entries` on the blocking pool with no history lock held.
    /// A failed save never interrupts the game.
    async fn persist_history(&self, entries: Vec<String>) {
        let store = self.history_store.clone();
        match tokio::task::spawn_blocking(move || store.save(&entries)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to persist word history: {}", e),
            Err(e) => tracing::warn!("Word history save task failed: {}", e),
        }
    }
}
