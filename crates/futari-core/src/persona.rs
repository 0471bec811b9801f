//! Personas: immutable identity records and the per-persona dialogue state.
//!
//! Personas differ only by data. The two presets are the reference pair this
//! loop ships with: a strong-willed older sister and a soft-spoken, quietly
//! scheming younger one.

use crate::emotion::EmotionVector;
use crate::engine::ChatEngine;
use crate::error::{ChatResult, RenderingError};
use crate::llm::{ChatBackend, ChatMessage};
use crate::prompts;
use crate::render::SpeechRenderer;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Gender of a persona, with the Japanese label the prompts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label_ja(&self) -> &'static str {
        match self {
            Gender::Male => "男性",
            Gender::Female => "女性",
        }
    }
}

/// Immutable identity of one persona, created once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub name: String,
    /// Behavioral directives injected into the system prompt as bullets.
    pub traits: Vec<String>,
    /// Relational identity toward the user (姉, 妹, ...).
    pub identity: String,
    pub age: u8,
    pub gender: Gender,
    /// nijivoice voice-actor id.
    pub voice_id: String,
}

impl PersonaConfig {
    /// アリス: the strong-willed older sister.
    pub fn alice() -> Self {
        Self {
            name: "アリス".to_string(),
            traits: vec![
                "妹である user に対して、強気の姉らしい振る舞いをしろ".to_string(),
                "性格は少しきつめだが、ツンデレで妹に対して威張ったそぶりを見せる".to_string(),
                "妹のことが好きである".to_string(),
            ],
            identity: "姉".to_string(),
            age: 16,
            gender: Gender::Female,
            voice_id: "8c08fd5b-b3eb-4294-b102-a1da00f09c72".to_string(),
        }
    }

    /// ベリー: the soft-spoken, scheming younger sister.
    pub fn berry() -> Self {
        Self {
            name: "ベリー".to_string(),
            traits: vec![
                "姉である user に対して、少し生意気な妹のように振る舞いをしろ".to_string(),
                "性格は物腰し柔らかだが、少し原黒で賢く、姉が自分のことを好きなことを知っており、それを利用している".to_string(),
                "しかし、内心は姉のことが好きである".to_string(),
            ],
            identity: "妹".to_string(),
            age: 10,
            gender: Gender::Female,
            voice_id: "544f6937-f2cd-4fde-a094-a1d612071be3".to_string(),
        }
    }
}

/// One conversational identity: identity record, its own engine, and the
/// emotion vector from its latest spoken turn.
pub struct Persona {
    config: PersonaConfig,
    engine: ChatEngine,
    emotion: EmotionVector,
}

impl Persona {
    pub fn new(config: PersonaConfig, backend: Arc<dyn ChatBackend>) -> Self {
        let engine = ChatEngine::new(prompts::system_prompt(&config), backend);
        Self {
            config,
            engine,
            emotion: EmotionVector::default(),
        }
    }

    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.engine = self.engine.with_retry_budget(budget);
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Emotion vector from this persona's latest turn; all-zero until it
    /// has spoken.
    pub fn emotion(&self) -> &EmotionVector {
        &self.emotion
    }

    /// This persona's committed message history (for inspection and tests).
    pub fn history(&self) -> &[ChatMessage] {
        self.engine.history()
    }

    /// One spoken turn: delegate to the engine, adopt the returned emotion
    /// wholesale, hand back the sentence.
    pub async fn chat(
        &mut self,
        message: &str,
        peer_emotion: &EmotionVector,
    ) -> ChatResult<String> {
        let reply = self.engine.send(message, peer_emotion).await?;
        self.emotion = reply.emotion;
        Ok(reply.sentence)
    }

    /// Renders a sentence with this persona's voice. Everything past the
    /// trait boundary belongs to the collaborator.
    pub fn render_voice(
        &self,
        renderer: &dyn SpeechRenderer,
        sentence: &str,
    ) -> Result<PathBuf, RenderingError> {
        renderer.render(sentence, &self.config.voice_id, &self.config.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_reference_pair() {
        let alice = PersonaConfig::alice();
        assert_eq!(alice.name, "アリス");
        assert_eq!(alice.identity, "姉");
        assert_eq!(alice.age, 16);
        assert_eq!(alice.gender, Gender::Female);
        assert_eq!(alice.traits.len(), 3);

        let berry = PersonaConfig::berry();
        assert_eq!(berry.identity, "妹");
        assert_eq!(berry.age, 10);
        assert_ne!(alice.voice_id, berry.voice_id);
    }

    #[test]
    fn gender_labels() {
        assert_eq!(Gender::Female.label_ja(), "女性");
        assert_eq!(Gender::Male.label_ja(), "男性");
    }
}
