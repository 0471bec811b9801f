//! Round-robin dialogue orchestration over two (or more) personas.
//!
//! Each round the speaker answers the last sentence while seeing the
//! listener's emotion state, then the sentence is rendered and played before
//! the next turn starts. Turns are strictly sequential; each prompt depends
//! on the previous turn's output.

use crate::config::{DEFAULT_OPENING, DEFAULT_ROUNDS};
use crate::emotion::EmotionVector;
use crate::error::EngineError;
use crate::persona::Persona;
use crate::render::SpeechRenderer;
use std::path::PathBuf;
use tracing::{error, info};

/// One completed spoken turn, for transcripts and logging.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub speaker: String,
    pub sentence: String,
    pub emotion: EmotionVector,
    /// Saved audio file, when the renderer produced one and playback worked.
    pub audio_path: Option<PathBuf>,
}

pub struct DialogueOrchestrator {
    personas: Vec<Persona>,
    rounds: u32,
    opening: String,
}

impl DialogueOrchestrator {
    /// Round-robin over the given personas. The reference use case runs two,
    /// but nothing here caps the count.
    pub fn new(personas: Vec<Persona>) -> Self {
        debug_assert!(personas.len() >= 2, "dialogue needs at least two personas");
        Self {
            personas,
            rounds: DEFAULT_ROUNDS,
            opening: DEFAULT_OPENING.to_string(),
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_opening(mut self, opening: impl Into<String>) -> Self {
        self.opening = opening.into();
        self
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    /// Runs the configured number of rounds and returns the transcript.
    ///
    /// An engine failure (retry exhaustion or backend error) aborts the run
    /// before anything is rendered for that turn. Rendering and playback
    /// failures do not abort: the turn is already committed to history, so
    /// they are logged and the loop continues without audio for that turn.
    pub async fn run(
        &mut self,
        renderer: &dyn SpeechRenderer,
    ) -> Result<Vec<TurnRecord>, EngineError> {
        let mut last_message = self.opening.clone();
        let mut records = Vec::with_capacity(self.rounds as usize);
        for i in 0..self.rounds as usize {
            let speaker_idx = i % self.personas.len();
            let listener_idx = (i + 1) % self.personas.len();
            let listener_emotion = self.personas[listener_idx].emotion().clone();
            let speaker = &mut self.personas[speaker_idx];
            let sentence = speaker.chat(&last_message, &listener_emotion).await?;
            info!(speaker = speaker.name(), %sentence, "turn committed");

            let audio_path = match speaker.render_voice(renderer, &sentence) {
                Ok(path) if path.as_os_str().is_empty() => None,
                Ok(path) => match renderer.play(&path) {
                    Ok(()) => Some(path),
                    Err(e) => {
                        error!(speaker = speaker.name(), error = %e, "playback failed");
                        Some(path)
                    }
                },
                Err(e) => {
                    error!(speaker = speaker.name(), error = %e, "voice rendering failed");
                    None
                }
            };

            records.push(TurnRecord {
                speaker: speaker.name().to_string(),
                sentence: sentence.clone(),
                emotion: speaker.emotion().clone(),
                audio_path,
            });
            last_message = sentence;
        }
        Ok(records)
    }
}
