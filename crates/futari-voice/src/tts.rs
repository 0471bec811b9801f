//! nijivoice synthesis client.
//!
//! POST generate-voice for a voice actor, get back a download URL for the
//! rendered MP3. Credentials come from the environment.

use futari_core::error::RenderingError;
use serde::Deserialize;
use std::time::Duration;

const ENV_API_KEY: &str = "NIJIVOICE_API_KEY";
const API_BASE: &str = "https://api.nijivoice.com/api/platform/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Result type alias for rendering-side operations.
pub type VoiceResult<T> = Result<T, RenderingError>;

/// Synthesis parameters sent with every generate-voice call. Defaults match
/// the tuned values of the reference personas.
#[derive(Debug, Clone)]
pub struct SynthesisParams {
    pub format: String,
    pub speed: String,
    pub emotional_level: String,
    pub sound_duration: String,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            format: "mp3".to_string(),
            speed: "1.1".to_string(),
            emotional_level: "0.2".to_string(),
            sound_duration: "0.2".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateVoiceResponse {
    #[serde(rename = "generatedVoice")]
    generated_voice: GeneratedVoice,
}

#[derive(Debug, Deserialize)]
struct GeneratedVoice {
    #[serde(rename = "audioFileDownloadUrl")]
    audio_file_download_url: String,
}

/// Blocking nijivoice client. The dialogue loop is strictly sequential, so
/// synthesis blocks the turn the same way playback does.
pub struct NijivoiceTts {
    api_key: String,
    base_url: String,
    params: SynthesisParams,
    client: reqwest::blocking::Client,
}

impl NijivoiceTts {
    /// Build from NIJIVOICE_API_KEY. Returns `None` when unset or empty.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var(ENV_API_KEY).ok()?;
        let key = key.trim().to_string();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key))
    }

    /// Client with an explicit API key and default parameters.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            api_key: api_key.into().trim().to_string(),
            base_url: API_BASE.to_string(),
            params: SynthesisParams::default(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_params(mut self, params: SynthesisParams) -> Self {
        self.params = params;
        self
    }

    /// Synthesizes `sentence` for the given voice actor and returns the MP3
    /// download URL.
    pub fn synthesize(&self, sentence: &str, voice_id: &str) -> VoiceResult<String> {
        let url = format!(
            "{}/voice-actors/{}/generate-voice",
            self.base_url.trim_end_matches('/'),
            voice_id
        );
        let body = serde_json::json!({
            "format": self.params.format,
            "script": sentence,
            "speed": self.params.speed,
            "emotionalLevel": self.params.emotional_level,
            "soundDuration": self.params.sound_duration,
        });
        let res = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| RenderingError::Synthesis(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(RenderingError::Synthesis(format!(
                "nijivoice API error {status}: {body}"
            )));
        }
        let parsed: GenerateVoiceResponse = res
            .json()
            .map_err(|e| RenderingError::Synthesis(format!("response decode failed: {e}")))?;
        Ok(parsed.generated_voice.audio_file_download_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_extracts_download_url() {
        let raw = r#"{
            "generatedVoice": {
                "audioFileUrl": "https://example.com/stream",
                "audioFileDownloadUrl": "https://example.com/download.mp3",
                "duration": 1625,
                "remainingCredits": 4990
            }
        }"#;
        let parsed: GenerateVoiceResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.generated_voice.audio_file_download_url,
            "https://example.com/download.mp3"
        );
    }

    #[test]
    fn default_params_match_reference_tuning() {
        let params = SynthesisParams::default();
        assert_eq!(params.format, "mp3");
        assert_eq!(params.speed, "1.1");
        assert_eq!(params.emotional_level, "0.2");
        assert_eq!(params.sound_duration, "0.2");
    }
}
