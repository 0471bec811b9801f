//! Error taxonomy for the dialogue core.

use thiserror::Error;

/// Result type alias for turn-generation operations.
pub type ChatResult<T> = Result<T, EngineError>;

/// Structured-reply violations. Both classes feed the same in-engine retry;
/// they stay distinguishable so logs and tests can tell a broken emotion map
/// from a broken top level.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// Emotion map decode failure: unknown key, missing key, or a value
    /// outside the intensity range.
    #[error("malformed emotion map: {0}")]
    MalformedEmotion(String),

    /// Top-level structural violation: not a bare two-field JSON object.
    #[error("response format violation: {0}")]
    Format(String),
}

/// Transport-level failure from the chat-completion backend. Never retried
/// by the engine; the caller decides whether to re-issue the whole turn.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("missing API credentials: {0}")]
    MissingCredentials(String),

    #[error("chat request failed: {0}")]
    Transport(String),

    #[error("chat API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Terminal failures of one `send` operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Retry budget exceeded. Carries the attempt count and the last raw
    /// reply for diagnostics.
    #[error("no parsable reply after {attempts} attempts; last raw output: {last_raw}")]
    GenerationExhausted { attempts: u32, last_raw: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Speech-rendering collaborator failures. A turn already committed to
/// history stays committed when rendering fails.
#[derive(Debug, Error)]
pub enum RenderingError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("audio download failed: {0}")]
    Download(String),

    #[error("audio playback failed: {0}")]
    Playback(String),

    #[error("audio file error: {0}")]
    Io(#[from] std::io::Error),
}
