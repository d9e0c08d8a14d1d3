// JStage Relay - JSON relay for J-STAGE journal feeds and LLM-backed answers

pub mod config;
pub mod feed;      // Pure feed field extraction
pub mod journals;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;    // Upstream fetchers (J-STAGE, ministry news)
pub mod snapshot;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
