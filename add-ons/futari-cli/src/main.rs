//! Two-persona spoken dialogue demo.
//!
//! Loads `.env`, wires the chat backend and the nijivoice renderer, then
//! runs the configured number of rounds between アリス and ベリー, printing
//! the transcript with each speaker's emotion state.

use anyhow::Result;
use futari_core::{
    create_backend, DialogueOrchestrator, EngineConfig, NullRenderer, Persona, PersonaConfig,
    SpeechRenderer,
};
use futari_voice::NijivoiceRenderer;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[futari] .env not loaded: {e} (using system environment)");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    let backend = create_backend(&config);

    let personas = vec![
        Persona::new(PersonaConfig::alice(), Arc::clone(&backend))
            .with_retry_budget(config.retry_budget),
        Persona::new(PersonaConfig::berry(), backend).with_retry_budget(config.retry_budget),
    ];

    let renderer: Box<dyn SpeechRenderer> = match NijivoiceRenderer::from_env()? {
        Some(renderer) => Box::new(renderer),
        None => {
            tracing::warn!("NIJIVOICE_API_KEY not set; running without speech output");
            Box::new(NullRenderer)
        }
    };

    let mut orchestrator = DialogueOrchestrator::new(personas)
        .with_rounds(config.rounds)
        .with_opening(config.opening.as_str());

    let records = orchestrator.run(renderer.as_ref()).await?;

    for record in &records {
        println!("{}: {}", record.speaker, record.sentence);
        println!("- emotion: {}", record.emotion);
    }
    Ok(())
}
