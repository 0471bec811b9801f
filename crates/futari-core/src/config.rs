//! Runtime configuration loaded from `.env` / process environment.

use crate::llm::{LlmMode, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};

const ENV_LLM_MODE: &str = "FUTARI_LLM_MODE";
const ENV_LLM_API_URL: &str = "FUTARI_LLM_API_URL";
const ENV_LLM_MODEL: &str = "FUTARI_LLM_MODEL";
const ENV_TEMPERATURE: &str = "FUTARI_TEMPERATURE";
const ENV_RETRY_BUDGET: &str = "FUTARI_RETRY_BUDGET";
const ENV_ROUNDS: &str = "FUTARI_ROUNDS";
const ENV_OPENING: &str = "FUTARI_OPENING";

pub const DEFAULT_RETRY_BUDGET: u32 = 3;
pub const DEFAULT_ROUNDS: u32 = 1;
pub const DEFAULT_OPENING: &str = "適当な話題を出して";

/// Dialogue-loop configuration.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | FUTARI_LLM_MODE | live | "mock" runs without credentials. |
/// | OPENAI_API_KEY / FUTARI_LLM_API_KEY | — | Chat-completion bearer key. |
/// | FUTARI_LLM_API_URL | OpenAI /chat/completions | OpenAI-compatible endpoint. |
/// | FUTARI_LLM_MODEL | gpt-4o-mini | Model id. |
/// | FUTARI_TEMPERATURE | 0.7 | Sampling temperature. |
/// | FUTARI_RETRY_BUDGET | 3 | Parse-failure attempts per turn. |
/// | FUTARI_ROUNDS | 1 | Spoken turns per run. |
/// | FUTARI_OPENING | 適当な話題を出して | Opening user message. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: LlmMode,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub retry_budget: u32,
    pub rounds: u32,
    pub opening: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: LlmMode::Live,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            retry_budget: DEFAULT_RETRY_BUDGET,
            rounds: DEFAULT_ROUNDS,
            opening: DEFAULT_OPENING.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from environment. Unset or invalid values fall back to the
    /// defaults in the table above.
    pub fn from_env() -> Self {
        Self {
            mode: LlmMode::from_str(&env_string(ENV_LLM_MODE, "live")),
            api_url: env_string(ENV_LLM_API_URL, DEFAULT_API_URL),
            model: env_string(ENV_LLM_MODEL, DEFAULT_MODEL),
            temperature: env_parse(ENV_TEMPERATURE, DEFAULT_TEMPERATURE),
            retry_budget: env_parse(ENV_RETRY_BUDGET, DEFAULT_RETRY_BUDGET).max(1),
            rounds: env_parse(ENV_ROUNDS, DEFAULT_ROUNDS),
            opening: env_string(ENV_OPENING, DEFAULT_OPENING),
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
