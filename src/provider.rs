//! Model Providers
//!
//! A provider performs exactly one request/response round trip for a
//! structured generation. It does not retry and it does not interpret the
//! returned text beyond extracting it from the provider envelope.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, GeneratorSettings, ProviderKind};
use crate::prompt::{GenerationRequest, RESPONSE_MIME_TYPE};
use crate::schema::SchemaDialect;
use crate::utils::truncate::excerpt;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
}

/// Text extracted from a provider reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    /// `None` when the provider produced no candidate text at all
    pub text: Option<String>,
    /// Why generation stopped, or why nothing was produced
    pub finish_reason: Option<String>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), finish_reason: None }
    }

    pub fn empty(finish_reason: Option<String>) -> Self {
        Self { text: None, finish_reason }
    }
}

/// A model endpoint able to honour a response schema.
#[async_trait]
pub trait StructuredModelClient: Send + Sync {
    async fn generate_structured(&self, request: &GenerationRequest) -> Result<ModelReply, ProviderError>;
}

/// Build the client selected by `settings`, with its credential injected.
pub fn client_from_settings(settings: &GeneratorSettings) -> Result<Arc<dyn StructuredModelClient>, ConfigError> {
    match settings.provider {
        ProviderKind::Gemini => {
            let key = settings
                .api_key
                .clone()
                .ok_or(ConfigError::MissingCredential("gemini"))?;
            let mut client = GeminiClient::new(key);
            if let Some(url) = &settings.base_url {
                client = client.with_base_url(url.clone());
            }
            Ok(Arc::new(client))
        }
        ProviderKind::OpenAi => {
            let base = settings.base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string());
            // Local OpenAI-compatible servers commonly run without a key.
            if settings.api_key.is_none() && base == OPENAI_BASE_URL {
                return Err(ConfigError::MissingCredential("openai"));
            }
            Ok(Arc::new(OpenAICompatibleClient::new(base, settings.api_key.clone())))
        }
    }
}

async fn check_status(provider: &'static str, res: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body: excerpt(&body, ERROR_BODY_CHARS),
    })
}

// ──────────────────────────────────────────────────────────────────────────────
// GEMINI
// ──────────────────────────────────────────────────────────────────────────────

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request_body(request: &GenerationRequest) -> serde_json::Value {
        let mut generation_config = json!({
            "temperature": request.sampling.temperature,
            "maxOutputTokens": request.sampling.max_output_tokens,
            "responseMimeType": RESPONSE_MIME_TYPE,
            "responseSchema": request.schema.render(SchemaDialect::Gemini),
        });
        if let Some(budget) = request.sampling.thinking_budget {
            generation_config["thinkingConfig"] = json!({ "thinkingBudget": budget });
        }

        json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": generation_config,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    fn into_reply(self) -> ModelReply {
        let blocked = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelReply::empty(blocked.or_else(|| Some("NO_CANDIDATES".to_string())));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect();

        ModelReply {
            text: (!text.is_empty()).then_some(text),
            finish_reason: candidate.finish_reason,
        }
    }
}

#[async_trait]
impl StructuredModelClient for GeminiClient {
    async fn generate_structured(&self, request: &GenerationRequest) -> Result<ModelReply, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            request.model
        );
        debug!("POST {}", url);

        let res = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(request))
            .send()
            .await?;

        let envelope: GeminiResponse = check_status("gemini", res).await?.json().await?;
        Ok(envelope.into_reply())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// OPENAI-COMPATIBLE
// ──────────────────────────────────────────────────────────────────────────────

pub struct OpenAICompatibleClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn request_body(request: &GenerationRequest) -> serde_json::Value {
        json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.sampling.temperature,
            "max_tokens": request.sampling.max_output_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "intelligence_report",
                    "strict": true,
                    "schema": request.schema.render(SchemaDialect::JsonSchema),
                }
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl ChatCompletion {
    fn into_reply(self) -> ModelReply {
        let Some(choice) = self.choices.into_iter().next() else {
            return ModelReply::empty(Some("no_choices".to_string()));
        };
        match choice.message {
            Some(ChatMessage { refusal: Some(_), .. }) => ModelReply::empty(Some("refusal".to_string())),
            Some(ChatMessage { content, .. }) => ModelReply {
                text: content.filter(|c| !c.is_empty()),
                finish_reason: choice.finish_reason,
            },
            None => ModelReply::empty(choice.finish_reason),
        }
    }
}

#[async_trait]
impl StructuredModelClient for OpenAICompatibleClient {
    async fn generate_structured(&self, request: &GenerationRequest) -> Result<ModelReply, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("POST {}", url);

        let mut req = self.client.post(url).json(&Self::request_body(request));
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await?;
        let completion: ChatCompletion = check_status("openai", res).await?.json().await?;
        Ok(completion.into_reply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitoringConfiguration;

    fn request() -> GenerationRequest {
        GenerationRequest::compose(&MonitoringConfiguration::default(), &GeneratorSettings::default())
    }

    #[test]
    fn test_gemini_body_shape() {
        let body = GeminiClient::request_body(&request());
        let cfg = &body["generationConfig"];
        assert_eq!(cfg["responseMimeType"], "application/json");
        assert_eq!(cfg["maxOutputTokens"], 3000);
        assert_eq!(cfg["thinkingConfig"]["thinkingBudget"], 1000);
        assert_eq!(cfg["responseSchema"]["type"], "OBJECT");
        assert!(body["contents"][0]["parts"][0]["text"].as_str().unwrap().contains("MONITORING CONTEXT"));
    }

    #[test]
    fn test_gemini_body_without_thinking_budget() {
        let mut req = request();
        req.sampling.thinking_budget = None;
        let body = GeminiClient::request_body(&req);
        assert!(body["generationConfig"].get("thinkingConfig").is_none());
    }

    #[test]
    fn test_gemini_reply_skips_thought_parts() {
        let envelope: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "planning the report", "thought": true },
                    { "text": "{\"a\":" },
                    { "text": "1}" }
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        let reply = envelope.into_reply();
        assert_eq!(reply.text.as_deref(), Some("{\"a\":1}"));
        assert_eq!(reply.finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_gemini_blocked_prompt_is_empty() {
        let envelope: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(envelope.into_reply(), ModelReply::empty(Some("SAFETY".into())));
    }

    #[test]
    fn test_gemini_truncated_candidate_without_text() {
        let envelope: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        let reply = envelope.into_reply();
        assert!(reply.text.is_none());
        assert_eq!(reply.finish_reason.as_deref(), Some("MAX_TOKENS"));
    }

    #[test]
    fn test_openai_body_uses_strict_json_schema() {
        let body = OpenAICompatibleClient::request_body(&request());
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["response_format"]["json_schema"]["schema"]["type"], "object");
        assert_eq!(body["max_tokens"], 3000);
    }

    #[test]
    fn test_openai_refusal_is_empty() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{ "message": { "content": null, "refusal": "I can't help with that." }, "finish_reason": "stop" }]
        }))
        .unwrap();
        assert_eq!(completion.into_reply(), ModelReply::empty(Some("refusal".into())));
    }

    #[test]
    fn test_client_requires_credential() {
        let settings = GeneratorSettings::default();
        assert!(matches!(
            client_from_settings(&settings),
            Err(ConfigError::MissingCredential("gemini"))
        ));

        let local = GeneratorSettings {
            provider: ProviderKind::OpenAi,
            base_url: Some("http://localhost:8000/v1".into()),
            ..GeneratorSettings::default()
        };
        assert!(client_from_settings(&local).is_ok());
    }
}
