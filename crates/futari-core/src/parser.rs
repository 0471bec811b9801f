//! Structured reply parsing: one JSON object, exactly `sentence` + `emotion`.

use crate::emotion::EmotionVector;
use crate::error::ParseError;

/// The decoded, validated output of one successful generation attempt.
/// Ephemeral; the persona consumes it immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub sentence: String,
    pub emotion: EmotionVector,
}

/// Parses a raw model reply against the structured contract.
///
/// Markdown fencing is a format error, not a variant to unwrap: the system
/// prompt forbids it, and rejecting it feeds the engine's corrective retry.
pub fn parse_reply(raw: &str) -> Result<TurnReply, ParseError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("```") {
        return Err(ParseError::Format("reply wrapped in markdown fencing".into()));
    }
    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| ParseError::Format(format!("not a JSON object: {e}")))?;
    let map = value
        .as_object()
        .ok_or_else(|| ParseError::Format("top level is not an object".into()))?;
    for key in map.keys() {
        if key != "sentence" && key != "emotion" {
            return Err(ParseError::Format(format!("unexpected top-level key: {key}")));
        }
    }
    let sentence = map
        .get("sentence")
        .ok_or_else(|| ParseError::Format("missing \"sentence\" key".into()))?
        .as_str()
        .ok_or_else(|| ParseError::Format("\"sentence\" is not a string".into()))?
        .to_string();
    let emotion = map
        .get("emotion")
        .ok_or_else(|| ParseError::Format("missing \"emotion\" key".into()))?;
    let emotion = EmotionVector::decode(emotion)?;
    Ok(TurnReply { sentence, emotion })
}
