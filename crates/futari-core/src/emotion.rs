//! The closed emotion set and its fixed-dimension intensity vector.
//!
//! Every reply must score all six emotions on a 0-5 scale. Decoding is
//! strict: an unknown key, a missing key, or an out-of-range value rejects
//! the whole map, so the engine can retry it exactly like a JSON syntax
//! error.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest intensity the model may assign to one emotion.
pub const MAX_INTENSITY: u8 = 5;

/// The enumerated emotion set. Wire names are the lowercase variant names;
/// the Japanese labels match the persona prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Joy,
    Sad,
    Angry,
    Fear,
    Surprise,
}

impl Emotion {
    /// Every emotion, in wire order.
    pub const ALL: [Emotion; 6] = [
        Emotion::Happy,
        Emotion::Joy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fear,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Joy => "joy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
        }
    }

    /// Japanese display label, used in transcripts.
    pub fn label_ja(&self) -> &'static str {
        match self {
            Emotion::Happy => "幸せ",
            Emotion::Joy => "喜び",
            Emotion::Sad => "悲しい",
            Emotion::Angry => "怒り",
            Emotion::Fear => "恐怖",
            Emotion::Surprise => "驚き",
        }
    }
}

/// Intensity per enumerated emotion, each in `0..=MAX_INTENSITY`.
///
/// Starts all-zero and is replaced wholesale after each successful turn,
/// never partially mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionVector {
    pub happy: u8,
    pub joy: u8,
    pub sad: u8,
    pub angry: u8,
    pub fear: u8,
    pub surprise: u8,
}

impl EmotionVector {
    pub fn get(&self, emotion: Emotion) -> u8 {
        match emotion {
            Emotion::Happy => self.happy,
            Emotion::Joy => self.joy,
            Emotion::Sad => self.sad,
            Emotion::Angry => self.angry,
            Emotion::Fear => self.fear,
            Emotion::Surprise => self.surprise,
        }
    }

    fn slot_mut(&mut self, emotion: Emotion) -> &mut u8 {
        match emotion {
            Emotion::Happy => &mut self.happy,
            Emotion::Joy => &mut self.joy,
            Emotion::Sad => &mut self.sad,
            Emotion::Angry => &mut self.angry,
            Emotion::Fear => &mut self.fear,
            Emotion::Surprise => &mut self.surprise,
        }
    }

    /// Decodes the `emotion` object of a structured reply.
    ///
    /// The key set must be exactly the enumerated set and every value an
    /// integer in `0..=MAX_INTENSITY`. Nothing is clamped or defaulted;
    /// invalid input is rejected so the retry loop treats it the same as a
    /// JSON syntax error.
    pub fn decode(value: &serde_json::Value) -> Result<Self, ParseError> {
        let map = value
            .as_object()
            .ok_or_else(|| ParseError::MalformedEmotion("emotion is not an object".into()))?;
        for key in map.keys() {
            if !Emotion::ALL.iter().any(|e| e.as_str() == key) {
                return Err(ParseError::MalformedEmotion(format!(
                    "unrecognized emotion key: {key}"
                )));
            }
        }
        let mut out = EmotionVector::default();
        for emotion in Emotion::ALL {
            let raw = map.get(emotion.as_str()).ok_or_else(|| {
                ParseError::MalformedEmotion(format!("missing emotion key: {}", emotion.as_str()))
            })?;
            let intensity = raw
                .as_u64()
                .filter(|n| *n <= MAX_INTENSITY as u64)
                .ok_or_else(|| {
                    ParseError::MalformedEmotion(format!(
                        "intensity for {} must be an integer in 0..={MAX_INTENSITY}, got {raw}",
                        emotion.as_str()
                    ))
                })?;
            *out.slot_mut(emotion) = intensity as u8;
        }
        Ok(out)
    }
}

impl fmt::Display for EmotionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, emotion) in Emotion::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", emotion.label_ja(), self.get(*emotion))?;
        }
        Ok(())
    }
}
