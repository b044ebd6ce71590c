use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// HTTP client shared by the scrape and search tools.
    pub http: reqwest::Client,
}
