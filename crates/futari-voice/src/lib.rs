//! futari-voice — speech rendering for the dialogue loop.
//!
//! nijivoice synthesis, MP3 download, rodio playback, and the
//! [`SpeechRenderer`] implementation the orchestrator talks to.

mod download;
mod playback;
mod tts;

pub use download::{audio_file_path, download_file};
pub use playback::VoicePlayback;
pub use tts::{NijivoiceTts, SynthesisParams, VoiceResult};

use futari_core::error::RenderingError;
use futari_core::render::SpeechRenderer;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_VOICE_DIR: &str = "FUTARI_VOICE_DIR";
const DEFAULT_VOICE_DIR: &str = "voices";

/// Full rendering pipeline: synthesize, download, play.
pub struct NijivoiceRenderer {
    tts: NijivoiceTts,
    playback: VoicePlayback,
    download_client: reqwest::blocking::Client,
    voice_dir: PathBuf,
}

impl NijivoiceRenderer {
    /// Build from the environment (NIJIVOICE_API_KEY, FUTARI_VOICE_DIR).
    /// `Ok(None)` when no API key is configured; an error only when the
    /// audio device cannot be opened.
    pub fn from_env() -> VoiceResult<Option<Self>> {
        let Some(tts) = NijivoiceTts::from_env() else {
            return Ok(None);
        };
        let voice_dir = std::env::var(ENV_VOICE_DIR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VOICE_DIR.to_string());
        Ok(Some(Self {
            tts,
            playback: VoicePlayback::new()?,
            download_client: reqwest::blocking::Client::new(),
            voice_dir: PathBuf::from(voice_dir),
        }))
    }
}

impl SpeechRenderer for NijivoiceRenderer {
    fn render(
        &self,
        sentence: &str,
        voice_id: &str,
        speaker: &str,
    ) -> Result<PathBuf, RenderingError> {
        let url = self.tts.synthesize(sentence, voice_id)?;
        let path = audio_file_path(&self.voice_dir, speaker);
        download_file(&self.download_client, &url, &path)?;
        debug!(path = %path.display(), "rendered voice saved");
        Ok(path)
    }

    fn play(&self, path: &Path) -> Result<(), RenderingError> {
        self.playback.play_file(path)
    }
}
