//! chordr-an - Audio Analysis Service
//!
//! Accepts audio uploads over HTTP, runs chord/key detection and lyric
//! transcription in background workers, and serves the persisted result
//! documents.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use chordr_common::events::EventBus;

use chordr_an::analysis::{ChordEngine, EngineConfig};
use chordr_an::config::ServiceConfig;
use chordr_an::extractors::{UnavailableFeatureExtractor, UnavailableTranscriber};
use chordr_an::services::{AnalysisOrchestrator, JobStore, OrchestratorConfig, WorkerPool};
use chordr_an::transcript::LyricExtractor;
use chordr_an::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting chordr-an (Audio Analysis) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let cli_data_folder = std::env::args().nth(1);
    let config = Arc::new(ServiceConfig::resolve(cli_data_folder.as_deref()));
    info!("Data folder: {}", config.data_folder.display());

    std::fs::create_dir_all(config.uploads_dir())?;
    std::fs::create_dir_all(config.output_dir())?;

    let store = Arc::new(JobStore::load(config.ledger_path()));
    let events = EventBus::new(100);

    // No DSP backend or speech model is bundled with this build; runs
    // will fail with a classified missing-dependency error until real
    // collaborators are wired in.
    warn!("Chroma feature backend not configured, chord analysis will be unavailable");
    warn!("Transcription model not configured, lyric extraction will be unavailable");
    let features = Arc::new(UnavailableFeatureExtractor);
    let transcriber = Arc::new(UnavailableTranscriber);

    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        Arc::clone(&store),
        features,
        ChordEngine::new(EngineConfig::default()),
        LyricExtractor::new(transcriber),
        events.clone(),
        OrchestratorConfig::default(),
        config.output_dir(),
    ));

    let pool = Arc::new(WorkerPool::new(config.worker_concurrency));
    info!("Worker pool: {} concurrent runs", pool.concurrency());

    let state = AppState::new(store, orchestrator, pool, events, Arc::clone(&config));
    let app = chordr_an::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
