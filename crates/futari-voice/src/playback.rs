//! MP3 playback through the default audio device.

use crate::tts::VoiceResult;
use futari_core::error::RenderingError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Owns a rodio sink for sequential playback of rendered turns.
pub struct VoicePlayback {
    _stream: OutputStream,
    _stream_handle: OutputStreamHandle,
    sink: Sink,
}

impl VoicePlayback {
    /// Default output device.
    pub fn new() -> VoiceResult<Self> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| RenderingError::Playback(e.to_string()))?;
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| RenderingError::Playback(e.to_string()))?;
        info!("audio sink ready for playback");
        Ok(Self {
            _stream: stream,
            _stream_handle: stream_handle,
            sink,
        })
    }

    /// Queues the file and blocks until it has played out, so one spoken
    /// turn finishes before the next persona answers.
    pub fn play_file(&self, path: &Path) -> VoiceResult<()> {
        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| RenderingError::Playback(format!("decode failed: {e}")))?;
        self.sink.append(source);
        self.sink.sleep_until_end();
        Ok(())
    }
}
