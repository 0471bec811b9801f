//! **ChatEngine** — the turn-generation engine.
//!
//! Owns one persona's ordered message history and drives the backend under
//! the structured reply contract. Parse failures are retried inside a
//! bounded loop with a rollback invariant: at any instant there is at most
//! one trailing uncommitted user message, and a failed turn leaves the
//! committed history exactly as it was before the turn started.

use crate::config::DEFAULT_RETRY_BUDGET;
use crate::emotion::EmotionVector;
use crate::error::{ChatResult, EngineError};
use crate::llm::{ChatBackend, ChatMessage};
use crate::parser::{parse_reply, TurnReply};
use crate::prompts::FORMAT_REMINDER;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ChatEngine {
    backend: Arc<dyn ChatBackend>,
    history: Vec<ChatMessage>,
    retry_budget: u32,
}

impl ChatEngine {
    /// Engine seeded with one system message built from the persona's
    /// instruction text.
    pub fn new(system_prompt: impl Into<String>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            history: vec![ChatMessage::system(system_prompt)],
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    /// Parse-failure attempts per turn. Clamped to at least 1.
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget.max(1);
        self
    }

    /// Committed message history, system message first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// One full turn: append `user_text`, obtain a contract-valid reply
    /// within the retry budget, commit the assistant sentence.
    ///
    /// `peer_emotion` is routed here so the orchestrator can hand the
    /// listener's state to the speaker; it is not injected into the prompt.
    /// That mirrors present behavior and is intentional, not an oversight.
    ///
    /// Backend transport failures are not retried: they surface immediately
    /// with the pending user message rolled back, and the caller decides
    /// whether to re-issue the turn.
    pub async fn send(
        &mut self,
        user_text: &str,
        peer_emotion: &EmotionVector,
    ) -> ChatResult<TurnReply> {
        debug!(%peer_emotion, "peer emotion received (not injected into prompt)");
        self.history.push(ChatMessage::user(user_text));
        let mut last_raw = String::new();
        for attempt in 1..=self.retry_budget {
            let raw = match self.backend.complete(&self.history).await {
                Ok(raw) => raw,
                Err(e) => {
                    self.history.pop();
                    return Err(EngineError::Backend(e));
                }
            };
            match parse_reply(&raw) {
                Ok(reply) => {
                    self.history.push(ChatMessage::assistant(reply.sentence.clone()));
                    return Ok(reply);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "reply failed the structured contract; retrying");
                    last_raw = raw;
                    // Swap the pending user message for one carrying a fresh
                    // format reminder; the original text is preserved.
                    self.history.pop();
                    self.history
                        .push(ChatMessage::user(format!("{user_text}\n{FORMAT_REMINDER}")));
                }
            }
        }
        self.history.pop();
        Err(EngineError::GenerationExhausted {
            attempts: self.retry_budget,
            last_raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::llm::ChatRole;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const VALID: &str = r#"{"sentence":"今日は天気がいいね","emotion":{"happy":3,"joy":2,"sad":0,"angry":0,"fear":0,"surprise":1}}"#;

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, BackendError>>>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, BackendError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, _history: &[ChatMessage]) -> Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("backend script exhausted")
        }
    }

    #[tokio::test]
    async fn succeeds_first_attempt_and_commits_history() {
        let backend = ScriptedBackend::new(vec![Ok(VALID.to_string())]);
        let mut engine = ChatEngine::new("system", backend.clone());
        let reply = engine.send("適当な話題を出して", &EmotionVector::default()).await.unwrap();
        assert_eq!(reply.sentence, "今日は天気がいいね");
        assert_eq!(backend.calls(), 1);
        let history = engine.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, ChatRole::User);
        assert_eq!(history[1].content, "適当な話題を出して");
        assert_eq!(history[2].role, ChatRole::Assistant);
        assert_eq!(history[2].content, "今日は天気がいいね");
    }

    #[tokio::test]
    async fn recovers_after_k_malformed_replies() {
        let backend = ScriptedBackend::new(vec![
            Ok("not json".to_string()),
            Ok(r#"{"sentence":"a"}"#.to_string()),
            Ok(VALID.to_string()),
        ]);
        let mut engine = ChatEngine::new("system", backend.clone());
        let reply = engine.send("話して", &EmotionVector::default()).await.unwrap();
        assert_eq!(reply.sentence, "今日は天気がいいね");
        assert_eq!(backend.calls(), 3);
        // Exactly one user and one assistant message for the turn, no
        // orphaned retry artifacts.
        let history = engine.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, ChatRole::User);
        assert!(history[1].content.starts_with("話して"));
        assert!(history[1].content.contains(FORMAT_REMINDER));
        assert_eq!(history[1].content.matches(FORMAT_REMINDER).count(), 1);
        assert_eq!(history[2].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn exhausts_after_budget_and_leaves_history_clean() {
        let backend = ScriptedBackend::new(vec![
            Ok("bad 1".to_string()),
            Ok("bad 2".to_string()),
            Ok("bad 3".to_string()),
            Ok(VALID.to_string()),
        ]);
        let mut engine = ChatEngine::new("system", backend.clone());
        let err = engine.send("話して", &EmotionVector::default()).await.unwrap_err();
        match err {
            EngineError::GenerationExhausted { attempts, last_raw } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_raw, "bad 3");
            }
            other => panic!("expected GenerationExhausted, got {other:?}"),
        }
        assert_eq!(backend.calls(), 3);
        // The failed turn left no trace; a fresh send succeeds cleanly.
        assert_eq!(engine.history().len(), 1);
        let reply = engine.send("もう一度", &EmotionVector::default()).await.unwrap();
        assert_eq!(reply.sentence, "今日は天気がいいね");
        assert_eq!(engine.history().len(), 3);
        assert_eq!(engine.history()[1].content, "もう一度");
    }

    #[tokio::test]
    async fn backend_error_surfaces_without_consuming_retries() {
        let backend = ScriptedBackend::new(vec![Err(BackendError::Transport(
            "connection refused".to_string(),
        ))]);
        let mut engine = ChatEngine::new("system", backend.clone());
        let err = engine.send("話して", &EmotionVector::default()).await.unwrap_err();
        assert!(matches!(err, EngineError::Backend(BackendError::Transport(_))));
        assert_eq!(backend.calls(), 1);
        assert_eq!(engine.history().len(), 1);
    }

    #[tokio::test]
    async fn custom_retry_budget_is_honored() {
        let backend = ScriptedBackend::new((0..5).map(|i| Ok(format!("bad {i}"))).collect());
        let mut engine = ChatEngine::new("system", backend.clone()).with_retry_budget(5);
        let err = engine.send("話して", &EmotionVector::default()).await.unwrap_err();
        assert!(matches!(err, EngineError::GenerationExhausted { attempts: 5, .. }));
        assert_eq!(backend.calls(), 5);
    }
}
