//! Chat-completion backend: message types, the backend seam, and the
//! OpenAI-compatible live client.

use crate::config::EngineConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const ENV_LLM_API_KEY: &str = "FUTARI_LLM_API_KEY";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Backend selection: live API or offline canned replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Live,
    Mock,
}

impl LlmMode {
    pub fn from_str(s: &str) -> Self {
        match s.trim() {
            s if s.eq_ignore_ascii_case("mock") => LlmMode::Mock,
            _ => LlmMode::Live,
        }
    }
}

/// Role of one conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of an engine's ordered message history. Owned by exactly one
/// engine; never shared across personas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Opaque chat-completion collaborator: full ordered history in, raw reply
/// text out. Implementations must not retry on their own; the engine owns
/// the retry policy.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, BackendError>;
}

// OpenAI-compatible request/response structures
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Live client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChat {
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiChat {
    /// API key from OPENAI_API_KEY, or FUTARI_LLM_API_KEY as fallback.
    /// Returns `None` when neither is set or the key is empty.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var(ENV_OPENAI_API_KEY)
            .or_else(|_| std::env::var(ENV_LLM_API_KEY))
            .ok()?;
        let key = key.trim().to_string();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key))
    }

    /// Client with an explicit API key and the default endpoint/model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into().trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            client,
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: &self.model,
            messages: history,
            temperature: Some(self.temperature),
        };
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, body });
        }
        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| BackendError::Transport(format!("response decode failed: {e}")))?;
        parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| BackendError::Transport("empty choices in chat response".into()))
    }
}

/// Offline backend: a fixed, contract-valid reply so the dialogue loop runs
/// without credentials (`FUTARI_LLM_MODE=mock`).
#[derive(Debug, Default)]
pub struct MockChat;

#[async_trait]
impl ChatBackend for MockChat {
    async fn complete(&self, _history: &[ChatMessage]) -> Result<String, BackendError> {
        Ok(serde_json::json!({
            "sentence": "（モック応答）今日も元気にやっていこう",
            "emotion": {"happy": 2, "joy": 1, "sad": 0, "angry": 0, "fear": 0, "surprise": 0},
        })
        .to_string())
    }
}

/// Picks the backend for the current config: the live client when a key is
/// present and mode is live, otherwise the offline mock. The fallback is
/// loud so a missing key never masquerades as a live run.
pub fn create_backend(config: &EngineConfig) -> Arc<dyn ChatBackend> {
    if config.mode == LlmMode::Mock {
        tracing::info!("LLM mode: mock (no API calls)");
        return Arc::new(MockChat);
    }
    match OpenAiChat::from_env() {
        Some(client) => Arc::new(
            client
                .with_api_url(&config.api_url)
                .with_model(&config.model)
                .with_temperature(config.temperature),
        ),
        None => {
            tracing::warn!(
                "no {ENV_OPENAI_API_KEY} or {ENV_LLM_API_KEY} set; falling back to mock replies"
            );
            Arc::new(MockChat)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_reply;

    #[test]
    fn llm_mode_parse() {
        assert_eq!(LlmMode::from_str("mock"), LlmMode::Mock);
        assert_eq!(LlmMode::from_str("Mock"), LlmMode::Mock);
        assert_eq!(LlmMode::from_str("live"), LlmMode::Live);
        assert_eq!(LlmMode::from_str(""), LlmMode::Live);
    }

    #[test]
    fn chat_message_serializes_lowercase_roles() {
        let json = serde_json::to_string(&ChatMessage::system("hi")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"hi"}"#);
    }

    #[tokio::test]
    async fn mock_reply_passes_the_contract() {
        let raw = MockChat.complete(&[]).await.unwrap();
        let reply = parse_reply(&raw).unwrap();
        assert!(!reply.sentence.is_empty());
        assert_eq!(reply.emotion.happy, 2);
    }
}
