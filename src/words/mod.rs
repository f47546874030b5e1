//! Word-pair acquisition: normalization, fallback catalog, generation,
//! de-duplication and the selection flow tying them together.

pub mod fallback;
pub mod generator;
pub mod normalize;
pub mod selection;
pub mod selector;

pub use fallback::{fallback_pairs, FALLBACK_WORDS_EN, FALLBACK_WORDS_ZH};
pub use generator::{
    build_prompt, pair_list_schema, parse_pairs, CandidateGenerator, CandidateRequest,
    GenerationError, LlmWordSource, SourceInfo, WordSource,
};
pub use normalize::{normalize, pair_signature};
pub use selection::{start_selection, SelectionConfig};
pub use selector::Selector;
