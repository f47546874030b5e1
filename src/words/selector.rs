//! Filtering and de-duplication of candidate pairs.

use crate::types::{Casing, Language, WordPair};
use crate::words::fallback::fallback_pairs;
use crate::words::normalize::normalize;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

/// Picks usable pairs from generated candidates, topping up from a fallback pool
#[derive(Debug, Clone)]
pub struct Selector {
    pool: Vec<WordPair>,
    casing: Casing,
}

/// Book-keeping for pairs accepted during one selection
struct Accepted<'a> {
    excluded: &'a HashSet<String>,
    signatures: HashSet<String>,
    pairs: Vec<WordPair>,
    casing: Casing,
}

impl<'a> Accepted<'a> {
    fn new(excluded: &'a HashSet<String>, casing: Casing, count: usize) -> Self {
        Self {
            excluded,
            signatures: HashSet::new(),
            pairs: Vec::with_capacity(count),
            casing,
        }
    }

    /// Accept `pair` if it passes every uniqueness rule.
    /// With `respect_exclude == false` history collisions are tolerated.
    fn offer(&mut self, pair: &WordPair, respect_exclude: bool) -> bool {
        let civilian = normalize(&pair.civilian_word);
        let undercover = normalize(&pair.undercover_word);

        if civilian.is_empty() || undercover.is_empty() || civilian == undercover {
            return false;
        }
        if respect_exclude
            && (self.excluded.contains(&civilian) || self.excluded.contains(&undercover))
        {
            return false;
        }

        let signature = format!("{}|{}", civilian, undercover);
        if !self.signatures.insert(signature) {
            return false;
        }

        self.pairs.push(pair.cased(self.casing));
        true
    }

    fn len(&self) -> usize {
        self.pairs.len()
    }
}

impl Selector {
    pub fn new(pool: Vec<WordPair>, casing: Casing) -> Self {
        Self { pool, casing }
    }

    /// Selector over the built-in catalog for `language`
    pub fn for_language(language: Language) -> Self {
        Self::new(fallback_pairs(language), language.casing())
    }

    pub fn pool(&self) -> &[WordPair] {
        &self.pool
    }

    /// Select exactly `count` pairs (given a non-empty pool).
    ///
    /// Candidates are taken in order; shortfalls are filled from the shuffled
    /// pool. When every pool pair collides with `exclude`, repeats are returned
    /// instead of failing.
    pub fn select(
        &self,
        candidates: &[WordPair],
        exclude: &[String],
        count: usize,
    ) -> Vec<WordPair> {
        self.select_with_rng(candidates, exclude, count, &mut rand::rng())
    }

    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        candidates: &[WordPair],
        exclude: &[String],
        count: usize,
        rng: &mut R,
    ) -> Vec<WordPair> {
        let excluded: HashSet<String> = exclude
            .iter()
            .map(|w| normalize(w))
            .filter(|w| !w.is_empty())
            .collect();
        let mut accepted = Accepted::new(&excluded, self.casing, count);

        for candidate in candidates {
            if accepted.len() == count {
                break;
            }
            accepted.offer(candidate, true);
        }
        let from_candidates = accepted.len();

        if accepted.len() < count {
            let mut shuffled: Vec<&WordPair> = self.pool.iter().collect();
            shuffled.shuffle(rng);

            for pair in &shuffled {
                if accepted.len() == count {
                    break;
                }
                accepted.offer(pair, true);
            }

            if accepted.len() < count {
                tracing::warn!(
                    "Fallback pool exhausted ({} of {} pairs usable), allowing repeats",
                    accepted.len(),
                    count
                );

                // Previously used words, but still no duplicate within this result
                for pair in &shuffled {
                    if accepted.len() == count {
                        break;
                    }
                    accepted.offer(pair, false);
                }

                while accepted.len() < count {
                    match self.pool.choose(rng) {
                        Some(pair) => accepted.pairs.push(pair.cased(self.casing)),
                        None => break,
                    }
                }
            }
        }

        tracing::debug!(
            "Selected {} pair(s): {} from candidates, {} from fallback",
            accepted.len(),
            from_candidates,
            accepted.len() - from_candidates
        );

        accepted.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::fallback::FALLBACK_WORDS_EN;
    use crate::words::normalize::pair_signature;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn every_fallback_word(language: Language) -> Vec<String> {
        fallback_pairs(language)
            .into_iter()
            .flat_map(|p| [p.civilian_word, p.undercover_word])
            .collect()
    }

    fn assert_rules_hold(pairs: &[WordPair], exclude: &[String]) {
        let excluded: HashSet<String> = exclude.iter().map(|w| normalize(w)).collect();
        let mut signatures = HashSet::new();
        for pair in pairs {
            let civilian = normalize(&pair.civilian_word);
            let undercover = normalize(&pair.undercover_word);
            assert_ne!(civilian, undercover);
            assert!(!excluded.contains(&civilian), "{} was excluded", civilian);
            assert!(!excluded.contains(&undercover), "{} was excluded", undercover);
            assert!(signatures.insert(pair_signature(&civilian, &undercover)));
        }
    }

    #[test]
    fn test_candidates_taken_in_order() {
        let selector = Selector::for_language(Language::En);
        let candidates = vec![
            WordPair::new("lipstick", "crayon"),
            WordPair::new("piano", "organ"),
        ];

        let picked = selector.select(&candidates, &[], 2);

        assert_eq!(
            picked,
            vec![
                WordPair::new("Lipstick", "Crayon"),
                WordPair::new("Piano", "Organ"),
            ]
        );
    }

    #[test]
    fn test_rejects_equal_words_and_history() {
        let selector = Selector::for_language(Language::En);
        let candidates = vec![
            WordPair::new("Moon", "moon!"),
            WordPair::new("Coffee", "Espresso"),
            WordPair::new("Sun", "Star"),
        ];
        let exclude = vec!["coffee".to_string()];

        let picked = selector.select(&candidates, &exclude, 1);

        assert_eq!(picked, vec![WordPair::new("Sun", "Star")]);
    }

    #[test]
    fn test_signature_collision_across_parallel_results() {
        let selector = Selector::for_language(Language::En);
        // Two attempts answered with the same pair in different case
        let candidates = vec![
            WordPair::new("Apple", "Pear"),
            WordPair::new("apple", "PEAR"),
        ];

        let picked = selector.select(&candidates, &[], 2);

        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0], WordPair::new("Apple", "Pear"));
        let apple_pears = picked
            .iter()
            .filter(|p| pair_signature(&p.civilian_word, &p.undercover_word) == "apple|pear")
            .count();
        assert_eq!(apple_pears, 1);
    }

    #[test]
    fn test_backfills_from_pool_without_candidates() {
        let selector = Selector::for_language(Language::En);
        let picked = selector.select(&[], &[], 3);

        assert_eq!(picked.len(), 3);
        for pair in &picked {
            assert!(FALLBACK_WORDS_EN
                .iter()
                .any(|(c, u)| *c == pair.civilian_word && *u == pair.undercover_word));
        }
        assert_rules_hold(&picked, &[]);
    }

    #[test]
    fn test_backfill_respects_history() {
        let selector = Selector::for_language(Language::En);
        let mut rng = StdRng::seed_from_u64(7);
        let exclude: Vec<String> = every_fallback_word(Language::En)
            .into_iter()
            .filter(|w| w != "Cat" && w != "Dog")
            .collect();

        for _ in 0..20 {
            let picked = selector.select_with_rng(&[], &exclude, 1, &mut rng);
            assert_eq!(picked, vec![WordPair::new("Cat", "Dog")]);
        }
    }

    #[test]
    fn test_exhausted_pool_returns_repeat() {
        let selector = Selector::for_language(Language::En);
        let exclude = every_fallback_word(Language::En);

        let picked = selector.select(&[], &exclude, 1);

        assert_eq!(picked.len(), 1);
        assert!(selector.pool().contains(&picked[0]));
    }

    #[test]
    fn test_always_returns_exact_count() {
        let selector = Selector::for_language(Language::Zh);
        let exclude = every_fallback_word(Language::Zh);
        let candidates = vec![WordPair::new("饺子", "包子")];
        let mut rng = StdRng::seed_from_u64(42);

        for count in 0..=12 {
            let picked = selector.select_with_rng(&candidates, &exclude, count, &mut rng);
            assert_eq!(picked.len(), count);
        }
    }

    #[test]
    fn test_repeats_stay_unique_while_pool_allows() {
        let selector = Selector::for_language(Language::En);
        let exclude = every_fallback_word(Language::En);

        let picked = selector.select(&[], &exclude, FALLBACK_WORDS_EN.len());

        let signatures: HashSet<_> = picked
            .iter()
            .map(|p| pair_signature(&p.civilian_word, &p.undercover_word))
            .collect();
        assert_eq!(signatures.len(), FALLBACK_WORDS_EN.len());
    }

    #[test]
    fn test_zh_words_kept_verbatim() {
        let selector = Selector::for_language(Language::Zh);
        let candidates = vec![WordPair::new("iphone手机", "安卓手机")];

        let picked = selector.select(&candidates, &[], 1);

        assert_eq!(picked[0].civilian_word, "iphone手机");
    }

    #[test]
    fn test_properties_hold_for_mixed_input() {
        let selector = Selector::for_language(Language::En);
        let mut rng = StdRng::seed_from_u64(1234);
        let candidates = vec![
            WordPair::new("Tea", "Coffee"),
            WordPair::new("Rocket", "Airplane"),
            WordPair::new("rocket", "airplane."),
            WordPair::new("Bread", "bread"),
            WordPair::new("Shark", "Dolphin"),
        ];
        let exclude = vec!["Tea".to_string(), "Violin".to_string(), "Bus".to_string()];

        for _ in 0..25 {
            let picked = selector.select_with_rng(&candidates, &exclude, 5, &mut rng);
            assert_eq!(picked.len(), 5);
            assert_eq!(picked[0], WordPair::new("Rocket", "Airplane"));
            assert_eq!(picked[1], WordPair::new("Shark", "Dolphin"));
            assert_rules_hold(&picked, &exclude);
        }
    }
}
