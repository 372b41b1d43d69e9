mod config;
mod dashboard;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::{PageOcr, PdfTextExtractor, TesseractOcr};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::pipeline::Screener;
use crate::screening::skills::SkillMap;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Job title → skills map: file override or the built-in roles
    let skills = match &config.skill_map_path {
        Some(path) => SkillMap::from_json_file(path)?,
        None => SkillMap::default(),
    };
    if skills.is_empty() {
        warn!("Skill map has no roles; every prompt will ask the model to infer skills");
    }
    info!(
        "Skill map loaded ({} roles: {})",
        skills.len(),
        skills.titles().collect::<Vec<_>>().join(", ")
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.openrouter_api_keys.clone())?;
    info!(
        "LLM client initialized (model: {}, {} credentials)",
        llm_client::MODEL,
        llm.pool_size()
    );

    // Initialize PDF extractor, with the OCR fallback unless disabled
    let ocr = config
        .ocr
        .enabled
        .then(|| {
            Arc::new(TesseractOcr::new(
                &config.ocr.pdftoppm_bin,
                &config.ocr.tesseract_bin,
            )) as Arc<dyn PageOcr>
        });
    info!("PDF extractor initialized (OCR fallback: {})", ocr.is_some());
    let extractor = PdfTextExtractor::new(ocr);

    info!(
        "Screening settings: {:?} replies, {:?} empty-filter policy, {} CV lines",
        config.screening.response_format,
        config.screening.empty_filter_policy,
        config.screening.max_cv_lines
    );

    // Build app state
    let state = AppState {
        screener: Screener {
            extractor: Arc::new(extractor),
            model: Arc::new(llm),
            skills: Arc::new(skills),
            settings: config.screening.clone(),
        },
        max_upload_bytes: config.max_upload_bytes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
