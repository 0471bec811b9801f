//! The speech-rendering seam.
//!
//! The dialogue core only needs "turn this sentence into a playable file,
//! then play it"; synthesis APIs, download, and audio devices live behind
//! this trait in the voice crate.

use crate::error::RenderingError;
use std::path::{Path, PathBuf};

/// Narrow collaborator interface for turning a sentence into played-back
/// audio. `speaker` labels the saved file.
pub trait SpeechRenderer {
    /// Synthesizes `sentence` with the given voice and saves it locally,
    /// returning the audio file path. An empty path means "nothing to play"
    /// and playback is skipped.
    fn render(
        &self,
        sentence: &str,
        voice_id: &str,
        speaker: &str,
    ) -> Result<PathBuf, RenderingError>;

    /// Plays a rendered audio file, blocking until playback finishes.
    fn play(&self, path: &Path) -> Result<(), RenderingError>;
}

/// Silent renderer: no synthesis, no playback. For tests and runs without
/// TTS credentials.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl SpeechRenderer for NullRenderer {
    fn render(
        &self,
        _sentence: &str,
        _voice_id: &str,
        _speaker: &str,
    ) -> Result<PathBuf, RenderingError> {
        Ok(PathBuf::new())
    }

    fn play(&self, _path: &Path) -> Result<(), RenderingError> {
        Ok(())
    }
}
