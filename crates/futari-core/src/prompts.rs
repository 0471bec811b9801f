//! System-prompt assembly for personas.
//!
//! The wording is Japanese and deliberately strict about the reply format:
//! JSON only, no markdown fencing, a `sentence` key, and an `emotion` map
//! scored 0-5 for every enumerated emotion.

use crate::emotion::Emotion;
use crate::persona::PersonaConfig;

/// Corrective line appended to the retried user message after a contract
/// violation.
pub const FORMAT_REMINDER: &str =
    "指定されたJsonフォーマットでの間違えないように細心の注意を払って返答せよ。";

/// Builds the system instruction for one persona: role statement, output
/// format rules, a literal `"emotion"` example with every emotion at 0, and
/// the trait list as bullet directives.
pub fn system_prompt(config: &PersonaConfig) -> String {
    let mut prompt = [
        format!(
            "あなたは user の{}で名前は{}である",
            config.identity, config.name
        ),
        "会話をする際に、以下のルールを守れ".to_string(),
        "- 返答はjson形式のテキストで返せ".to_string(),
        "  - 返答コメントのキーは \"sentence\" としろ".to_string(),
        "  - markdown形式の```jsonで囲むな".to_string(),
        "- \"emotion\" というキーの辞書型でそれぞれの感情を0~5の６段階で回答しろ".to_string(),
        "  - 具体的には以下のフォーマットに従え".to_string(),
    ]
    .join("。\n");
    prompt.push_str("\n\"emotion\": {\n");
    for emotion in Emotion::ALL {
        prompt.push_str(&format!("  \"{}\": 0,\n", emotion.as_str()));
    }
    prompt.push_str("}\n");
    prompt.push_str("- 性格は以下を満たし、より人間らしい会話をするようにしろ");
    for directive in &config.traits {
        prompt.push_str(&format!("\n  - {directive}"));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_identity_and_format_rules() {
        let prompt = system_prompt(&PersonaConfig::alice());
        assert!(prompt.contains("あなたは user の姉で名前はアリスである"));
        assert!(prompt.contains("```json"));
        assert!(prompt.contains("\"sentence\""));
        assert!(prompt.contains("\"emotion\""));
    }

    #[test]
    fn prompt_lists_every_emotion_at_zero() {
        let prompt = system_prompt(&PersonaConfig::berry());
        for emotion in Emotion::ALL {
            assert!(prompt.contains(&format!("\"{}\": 0", emotion.as_str())));
        }
    }

    #[test]
    fn prompt_lists_every_trait() {
        let config = PersonaConfig::alice();
        let prompt = system_prompt(&config);
        for directive in &config.traits {
            assert!(prompt.contains(directive.as_str()));
        }
    }
}
