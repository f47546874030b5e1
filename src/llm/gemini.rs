use super::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini provider (generateContent REST endpoint)
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> LlmResult<Self> {
        Ok(Self {
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
            client: http_client()?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

/// Text of the first candidate, parts concatenated and trimmed
fn response_text(response: GeminiResponse) -> LlmResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .ok_or_else(|| LlmError::ParseError("No candidates in response".to_string()))?;

    Ok(text.trim().to_string())
}

/// Gemini's schema dialect rejects `additionalProperties`
fn to_gemini_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(map) => map
            .iter()
            .filter(|(key, _)| key.as_str() != "additionalProperties")
            .map(|(key, value)| (key.clone(), to_gemini_schema(value)))
            .collect::<serde_json::Map<_, _>>()
            .into(),
        serde_json::Value::Array(items) => items.iter().map(to_gemini_schema).collect(),
        other => other.clone(),
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let start = Instant::now();

        let model = request
            .model_override
            .clone()
            .unwrap_or_else(|| self.model.clone());

        // max_tokens is not forwarded: thinking models spend the output budget before answering
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json".to_string()),
                response_schema: request.response_schema.as_ref().map(to_gemini_schema),
                temperature: request.temperature,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = tokio::time::timeout(
            request.timeout,
            self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| LlmError::Timeout(request.timeout))?
        .map_err(|e| LlmError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::ApiError(format!(
                "Gemini API returned status: {}",
                response.status()
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let tokens_used = gemini_response
            .usage_metadata
            .as_ref()
            .and_then(|u| u.total_token_count);
        let text = response_text(gemini_response)?;

        let latency_ms = start.elapsed().as_millis() as u64;

        Ok(GenerateResponse {
            text,
            metadata: ResponseMetadata {
                provider: "gemini".to_string(),
                model,
                tokens_used,
                latency_ms,
            },
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_drops_additional_properties() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "pairs": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["civilianWord"]
                    }
                }
            }
        });

        let converted = to_gemini_schema(&schema);

        assert!(converted.get("additionalProperties").is_none());
        let items = &converted["properties"]["pairs"]["items"];
        assert!(items.get("additionalProperties").is_none());
        assert_eq!(items["required"], json!(["civilianWord"]));
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = json!({
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [{ "text": " [{\"a\":" }, { "inlineData": {} }, { "text": "1}]\n" }]
                    }
                },
                { "content": { "role": "model", "parts": [{ "text": "ignored" }] } }
            ],
            "usageMetadata": { "totalTokenCount": 42 }
        });

        let parsed: GeminiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.usage_metadata.as_ref().unwrap().total_token_count, Some(42));

        assert_eq!(response_text(parsed).unwrap(), "[{\"a\":1}]");
    }

    #[test]
    fn test_response_text_without_candidates() {
        let empty: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(response_text(empty), Err(LlmError::ParseError(_))));

        let blocked: GeminiResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(matches!(response_text(blocked), Err(LlmError::ParseError(_))));
    }

    #[tokio::test]
    #[ignore] // Only run with actual API key
    async fn test_gemini_generate() {
        let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY not set");
        let provider = GeminiProvider::new(api_key, "gemini-2.5-flash".to_string()).unwrap();

        let request = GenerateRequest {
            prompt: "Give one pair of related drinks.".to_string(),
            max_tokens: None,
            timeout: Duration::from_secs(30),
            model_override: None,
            temperature: Some(0.9),
            response_schema: Some(crate::words::pair_list_schema()),
        };

        let response = provider.generate(request).await.unwrap();

        assert!(!response.text.is_empty());
        assert_eq!(response.metadata.provider, "gemini");
        println!("Generated text: {}", response.text);
    }
}
