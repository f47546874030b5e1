//! One full pick: generate candidates, filter them, fall back when needed.

use crate::types::{Language, WordPair};
use crate::words::generator::{CandidateGenerator, CandidateRequest};
use crate::words::selector::Selector;
use rand::seq::IndexedRandom;

/// How hard a selection tries the generation services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Concurrent generation requests per selection
    pub attempts: usize,
    /// Pairs asked for in each request
    pub candidates_per_request: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            attempts: 2,
            candidates_per_request: 3,
        }
    }
}

/// Pick the pair for the next game.
///
/// Generation failures never surface here: they leave the candidate list
/// short and the fallback catalog fills the gap.
pub async fn start_selection(
    generator: &CandidateGenerator,
    config: &SelectionConfig,
    topic: Option<&str>,
    language: Language,
    history: &[String],
) -> WordPair {
    let request = CandidateRequest::new(topic, language, history, config.candidates_per_request);

    let candidates = generator.generate_parallel(&request, config.attempts).await;

    let selector = Selector::for_language(language);
    let picked = selector.select(&candidates, &request.exclude, 1).into_iter().next();

    match picked {
        Some(pair) => {
            tracing::info!(
                "Selected a pair from {} candidate(s) ({} language)",
                candidates.len(),
                language.tag()
            );
            pair
        }
        // Only reachable with an empty catalog
        None => selector
            .pool()
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| WordPair::new("Coffee", "Tea")),
    }
}
