//! Gemini bridge: one `generateContent` call per request, text out.
//!
//! The bridge only moves bytes. Prompt building, JSON decoding of the reply and
//! fallback substitution live in the insight gateway.

use crate::config::ModelConfig;
use crate::error::{AuraError, AuraResult};
use crate::insight::types::ChatTurn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One request to the generative endpoint.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Conversation so far; a single user turn for one-shot prompts.
    pub contents: Vec<ChatTurn>,
    pub system_instruction: Option<String>,
    /// Ask for `application/json` output.
    pub json_mode: bool,
    pub temperature: Option<f32>,
}

impl GenerateRequest {
    /// One-shot prompt as a single user turn.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![ChatTurn::user(text)],
            ..Default::default()
        }
    }

    /// Multi-turn conversation.
    pub fn conversation(contents: Vec<ChatTurn>) -> Self {
        Self {
            contents,
            ..Default::default()
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn with_system(mut self, instruction: &str) -> Self {
        self.system_instruction = Some(instruction.to_string());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Concatenated text of every part, in order. Used for logging and tests.
    pub fn prompt_text(&self) -> String {
        self.contents
            .iter()
            .flat_map(|turn| turn.parts.iter().map(|p| p.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Backend that turns a request into model text. Implement for Gemini or a test double.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> AuraResult<String>;
}

// generateContent wire format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: &'a [ChatTurn],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl<'a> GeminiRequest<'a> {
    fn from_request(request: &'a GenerateRequest) -> Self {
        let generation_config = if request.json_mode || request.temperature.is_some() {
            Some(GenerationConfig {
                response_mime_type: request.json_mode.then_some("application/json"),
                temperature: request.temperature,
            })
        } else {
            None
        };
        Self {
            contents: &request.contents,
            system_instruction: request.system_instruction.as_deref().map(|text| {
                SystemInstruction {
                    parts: [TextPart { text }],
                }
            }),
            generation_config,
        }
    }
}

/// Text of the first candidate; `None` when the model returned no text at all.
fn first_candidate_text(response: GeminiResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    Some(text)
}

/// Gemini `generateContent` client.
pub struct GeminiBridge {
    api_key: String,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiBridge {
    /// Build from config. Fails without an API key or when the HTTP client cannot be built.
    pub fn from_config(config: &ModelConfig) -> AuraResult<Self> {
        let key = config
            .api_key()
            .ok_or_else(|| AuraError::ClientUnavailable("no model API key configured".into()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuraError::ClientUnavailable(e.to_string()))?;
        Ok(Self {
            api_key: key.to_string(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a bridge with an explicit API key and default settings.
    pub fn new(api_key: &str) -> AuraResult<Self> {
        Self::from_config(&ModelConfig {
            api_key: Some(api_key.to_string()),
            ..Default::default()
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl ModelBackend for GeminiBridge {
    async fn generate(&self, request: &GenerateRequest) -> AuraResult<String> {
        let body = GeminiRequest::from_request(request);
        tracing::debug!(
            model = %self.model,
            json_mode = request.json_mode,
            turns = request.contents.len(),
            "[AURA AI] generateContent"
        );

        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(AuraError::Api {
                service: "Gemini",
                status,
                body,
            });
        }

        let parsed: GeminiResponse = res
            .json()
            .await
            .map_err(|e| AuraError::Parse(format!("Gemini response: {}", e)))?;

        first_candidate_text(parsed)
            .ok_or_else(|| AuraError::Parse("Gemini returned no candidates".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_request_carries_mime_type_and_system() {
        let request = GenerateRequest::prompt("hi")
            .json()
            .with_system("be kind")
            .with_temperature(0.9);
        let v = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], "be kind");
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
        assert!((v["generationConfig"]["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn plain_request_omits_generation_config() {
        let request = GenerateRequest::prompt("title please");
        let v = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();
        assert!(v.get("generationConfig").is_none());
        assert!(v.get("systemInstruction").is_none());
    }

    #[test]
    fn candidate_parts_are_concatenated() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_candidate_text(parsed).as_deref(), Some("{\"a\":1}"));

        let empty: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(first_candidate_text(empty), None);
    }

    #[test]
    fn bridge_requires_key() {
        assert!(GeminiBridge::from_config(&ModelConfig::default()).is_err());
        let bridge = GeminiBridge::new("k").unwrap().with_model("gemini-2.5-flash");
        assert_eq!(
            bridge.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
