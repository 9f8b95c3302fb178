mod config;
mod dialogue;
mod documents;
mod errors;
mod job_search;
mod llm_client;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dialogue::{DialogueEngine, DialogueSettings};
use crate::documents::{DocxAssembler, PdfExtractor};
use crate::job_search::HhJobSearch;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Offer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        config.llm_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize vacancy search
    let job_search = HhJobSearch::new(config.hh_api_url.clone(), config.vacancy_page_size)?;
    info!(
        "Vacancy search initialized ({}, {} per page)",
        config.hh_api_url, config.vacancy_page_size
    );

    let settings = DialogueSettings {
        max_follow_ups: config.max_follow_ups,
    };
    info!("Adaptive follow-ups capped at {} per stage", settings.max_follow_ups);

    let engine = DialogueEngine::new(
        Arc::new(llm),
        Arc::new(PdfExtractor),
        Arc::new(DocxAssembler),
        Arc::new(job_search),
        settings,
    );

    // Build app state
    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
