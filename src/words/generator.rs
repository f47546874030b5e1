//! Candidate word pairs from external text-generation services.

use crate::history::HISTORY_WINDOW;
use crate::llm::{GenerateRequest, LlmConfig, LlmError, LlmProvider};
use crate::types::{Language, WordPair};
use crate::words::normalize::normalize;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Why a generation attempt produced nothing usable
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("empty response")]
    EmptyResponse,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("response does not match the pair schema: {0}")]
    SchemaMismatch(String),
}

/// What to ask a word source for
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRequest {
    pub language: Language,
    /// Trimmed topic, `None` when blank
    pub topic: Option<String>,
    /// Normalized recent history, oldest first, at most `HISTORY_WINDOW`
    pub exclude: Vec<String>,
    pub count: usize,
}

impl CandidateRequest {
    pub fn new(topic: Option<&str>, language: Language, exclude: &[String], count: usize) -> Self {
        let start = exclude.len().saturating_sub(HISTORY_WINDOW);
        let exclude = exclude[start..]
            .iter()
            .map(|w| normalize(w))
            .filter(|w| !w.is_empty())
            .collect();

        Self {
            language,
            topic: topic
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            exclude,
            count: count.max(1),
        }
    }
}

/// Capability to produce candidate pairs; fakes implement this in tests
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn generate(&self, request: &CandidateRequest) -> Result<Vec<WordPair>, GenerationError>;

    fn name(&self) -> &str;

    /// Model behind the source, when there is one
    fn model(&self) -> Option<&str> {
        None
    }
}

/// A configured source as reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub model: Option<String>,
}

/// Instruction payload sent to the model
pub fn build_prompt(request: &CandidateRequest) -> String {
    let topic = match &request.topic {
        Some(topic) => format!("All pairs must relate to the topic: \"{}\".", topic),
        None => "The words can come from any common category (e.g., Food, Objects, Places, People, Animals, Activities).".to_string(),
    };

    let exclusion = if request.exclude.is_empty() {
        String::new()
    } else {
        format!(
            "\n7. DO NOT use any of these words or close variations of them: {}.",
            request.exclude.join(", ")
        )
    };

    format!(
        "Generate {count} word pair(s) for the party game \"Who is the Undercover\" (also known as 谁是卧底).\n\
         \n\
         Rules for every pair:\n\
         1. Both words are nouns, a single word or a short phrase.\n\
         2. They are related enough that descriptions could be ambiguous (e.g., Apple vs Pear, Lipstick vs Crayon) but they are NOT the same thing.\n\
         3. Avoid obscure or technical terms; everyone at the table should know both words.\n\
         4. Prefer vivid, memorable nouns over generic ones.\n\
         5. Spread the pairs over different categories.\n\
         6. {language}{exclusion}\n\
         \n\
         {topic}\n\
         \n\
         Return JSON only: {{\"pairs\": [{{\"civilianWord\": \"...\", \"undercoverWord\": \"...\"}}]}}",
        count = request.count,
        language = request.language.instruction(),
        exclusion = exclusion,
        topic = topic,
    )
}

/// Fixed schema for the structured response
pub fn pair_list_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "pairs": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "civilianWord": { "type": "string" },
                        "undercoverWord": { "type": "string" }
                    },
                    "required": ["civilianWord", "undercoverWord"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["pairs"],
        "additionalProperties": false
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPair {
    civilian_word: String,
    undercover_word: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PairPayload {
    List(Vec<RawPair>),
    Wrapped { pairs: Vec<RawPair> },
    Single(RawPair),
}

/// Models sometimes wrap JSON in a Markdown fence
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => rest
            .strip_suffix("```")
            .unwrap_or(rest)
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim(),
        None => trimmed,
    }
}

/// Parse and validate a model response, applying the language's casing
pub fn parse_pairs(text: &str, language: Language) -> Result<Vec<WordPair>, GenerationError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| GenerationError::MalformedJson(e.to_string()))?;

    let raw = match serde_json::from_value::<PairPayload>(value) {
        Ok(PairPayload::List(pairs)) | Ok(PairPayload::Wrapped { pairs }) => pairs,
        Ok(PairPayload::Single(pair)) => vec![pair],
        Err(_) => {
            return Err(GenerationError::SchemaMismatch(
                "expected civilianWord/undercoverWord string pairs".to_string(),
            ))
        }
    };

    let casing = language.casing();
    raw.into_iter()
        .map(|pair| {
            let civilian = pair.civilian_word.trim();
            let undercover = pair.undercover_word.trim();
            if civilian.is_empty() || undercover.is_empty() {
                return Err(GenerationError::SchemaMismatch(
                    "pair with an empty word".to_string(),
                ));
            }
            Ok(WordPair::new(casing.apply(civilian), casing.apply(undercover)))
        })
        .collect()
}

/// `WordSource` backed by an LLM provider
pub struct LlmWordSource {
    provider: Box<dyn LlmProvider>,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl LlmWordSource {
    pub fn new(provider: Box<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            timeout: config.default_timeout,
            max_tokens: config.default_max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl WordSource for LlmWordSource {
    async fn generate(&self, request: &CandidateRequest) -> Result<Vec<WordPair>, GenerationError> {
        let response = self
            .provider
            .generate(GenerateRequest {
                prompt: build_prompt(request),
                max_tokens: Some(self.max_tokens),
                timeout: self.timeout,
                model_override: None,
                temperature: Some(self.temperature),
                response_schema: Some(pair_list_schema()),
            })
            .await?;

        tracing::info!(
            "{} ({}) answered in {}ms, tokens: {:?}",
            response.metadata.provider,
            response.metadata.model,
            response.metadata.latency_ms,
            response.metadata.tokens_used
        );

        let mut pairs = parse_pairs(&response.text, request.language)?;
        pairs.truncate(request.count);
        Ok(pairs)
    }

    fn name(&self) -> &str {
        self.provider.name()
    }

    fn model(&self) -> Option<&str> {
        Some(self.provider.model())
    }
}

/// Fans generation requests out over the configured word sources
pub struct CandidateGenerator {
    sources: Vec<Box<dyn WordSource>>,
    next: AtomicUsize,
}

impl CandidateGenerator {
    pub fn new(sources: Vec<Box<dyn WordSource>>) -> Self {
        Self {
            sources,
            next: AtomicUsize::new(0),
        }
    }

    /// Generator without any source; every call yields the fallback signal
    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    /// One source per configured provider, or a disabled generator
    pub fn from_config(config: &LlmConfig) -> Self {
        if !config.has_credentials() {
            tracing::warn!("No generation service configured. Fallback words will be used.");
            return Self::disabled();
        }

        match config.build_providers() {
            Ok(providers) => {
                let sources = providers
                    .into_iter()
                    .map(|p| Box::new(LlmWordSource::new(p, config)) as Box<dyn WordSource>)
                    .collect();
                Self::new(sources)
            }
            Err(e) => {
                tracing::warn!("{}. Fallback words will be used.", e);
                Self::disabled()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        !self.sources.is_empty()
    }

    pub fn sources(&self) -> Vec<SourceInfo> {
        self.sources
            .iter()
            .map(|s| SourceInfo {
                name: s.name().to_string(),
                model: s.model().map(str::to_string),
            })
            .collect()
    }

    /// Single request against the next source in rotation.
    ///
    /// Without any source this returns an empty list immediately, which
    /// callers treat as "use the fallback pool".
    pub async fn generate(
        &self,
        topic: Option<&str>,
        language: Language,
        exclude: &[String],
        count: usize,
    ) -> Result<Vec<WordPair>, GenerationError> {
        let request = CandidateRequest::new(topic, language, exclude, count);
        match self.reserve(1) {
            Some(offset) => self.attempt(offset, &request).await,
            None => Ok(Vec::new()),
        }
    }

    /// Run `attempts` requests concurrently, spread round-robin over the
    /// sources, and collect every pair from the ones that succeeded.
    /// Failures are logged and contribute nothing.
    pub async fn generate_parallel(&self, request: &CandidateRequest, attempts: usize) -> Vec<WordPair> {
        let attempts = attempts.max(1);
        let Some(offset) = self.reserve(attempts) else {
            return Vec::new();
        };

        let tasks = (offset..offset + attempts).map(move |slot| async move {
            self.attempt(slot, request).await.unwrap_or_else(|e| {
                tracing::error!("Word source {} failed: {}", self.source_at(slot).name(), e);
                Vec::new()
            })
        });

        futures::future::join_all(tasks)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Claim `attempts` consecutive rotation slots. `None` when there is no
    /// source to ask.
    fn reserve(&self, attempts: usize) -> Option<usize> {
        if self.sources.is_empty() {
            tracing::warn!("No generation service configured, using fallback words");
            return None;
        }
        Some(self.next.fetch_add(attempts, Ordering::Relaxed))
    }

    fn source_at(&self, slot: usize) -> &dyn WordSource {
        self.sources[slot % self.sources.len()].as_ref()
    }

    /// One request against the source at rotation slot `slot`
    async fn attempt(
        &self,
        slot: usize,
        request: &CandidateRequest,
    ) -> Result<Vec<WordPair>, GenerationError> {
        let source = self.source_at(slot);
        let pairs = source.generate(request).await?;
        tracing::debug!("{} returned {} candidate(s)", source.name(), pairs.len());
        Ok(pairs)
    }
}
