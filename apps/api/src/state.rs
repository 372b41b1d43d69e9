use crate::screening::pipeline::Screener;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Extractor, model client, skill map and run settings. Read-only after startup.
    pub screener: Screener,
    /// Multipart body limit for the screening upload route.
    pub max_upload_bytes: usize,
}
