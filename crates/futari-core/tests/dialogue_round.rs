//! End-to-end dialogue rounds against a scripted backend.

use async_trait::async_trait;
use futari_core::{
    BackendError, ChatBackend, ChatMessage, ChatRole, DialogueOrchestrator, EmotionVector,
    NullRenderer, Persona, PersonaConfig,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const WEATHER_REPLY: &str = r#"{"sentence":"今日は天気がいいね","emotion":{"happy":3,"joy":2,"sad":0,"angry":0,"fear":0,"surprise":1}}"#;
const ANSWER_REPLY: &str = r#"{"sentence":"そうだね、お姉ちゃん","emotion":{"happy":1,"joy":0,"sad":0,"angry":0,"fear":0,"surprise":0}}"#;

struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedBackend {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
        })
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, _history: &[ChatMessage]) -> Result<String, BackendError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BackendError::Transport("backend script exhausted".into()))
    }
}

fn pair(backend: Arc<dyn ChatBackend>) -> Vec<Persona> {
    vec![
        Persona::new(PersonaConfig::alice(), Arc::clone(&backend)),
        Persona::new(PersonaConfig::berry(), backend),
    ]
}

#[tokio::test]
async fn one_round_updates_only_the_speaker() {
    let backend = ScriptedBackend::new(&[WEATHER_REPLY]);
    let mut orchestrator = DialogueOrchestrator::new(pair(backend));

    let records = orchestrator.run(&NullRenderer).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].speaker, "アリス");
    assert_eq!(records[0].sentence, "今日は天気がいいね");
    assert!(records[0].audio_path.is_none());

    let expected = EmotionVector {
        happy: 3,
        joy: 2,
        sad: 0,
        angry: 0,
        fear: 0,
        surprise: 1,
    };
    let personas = orchestrator.personas();
    assert_eq!(*personas[0].emotion(), expected);
    // ベリー never spoke this round; her emotion stays at the default.
    assert_eq!(*personas[1].emotion(), EmotionVector::default());
}

#[tokio::test]
async fn two_rounds_alternate_and_chain_sentences() {
    let backend = ScriptedBackend::new(&[WEATHER_REPLY, ANSWER_REPLY]);
    let mut orchestrator = DialogueOrchestrator::new(pair(backend))
        .with_rounds(2)
        .with_opening("適当な話題を出して");

    let records = orchestrator.run(&NullRenderer).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].speaker, "アリス");
    assert_eq!(records[1].speaker, "ベリー");
    assert_eq!(records[1].sentence, "そうだね、お姉ちゃん");

    // The second speaker was prompted with the first speaker's sentence.
    let berry = &orchestrator.personas()[1];
    let user_turns: Vec<&ChatMessage> = berry
        .history()
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .collect();
    assert_eq!(user_turns.len(), 1);
    assert_eq!(user_turns[0].content, "今日は天気がいいね");
}

#[tokio::test]
async fn engine_failure_aborts_the_run() {
    // Script runs dry on the first call: the backend error must abort the
    // round with no transcript.
    let backend = ScriptedBackend::new(&[]);
    let mut orchestrator = DialogueOrchestrator::new(pair(backend));

    let err = orchestrator.run(&NullRenderer).await.unwrap_err();
    assert!(matches!(err, futari_core::EngineError::Backend(_)));
    assert_eq!(*orchestrator.personas()[0].emotion(), EmotionVector::default());
}
