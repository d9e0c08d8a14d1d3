use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;

use super::method_not_allowed;
use crate::models::{AppState, DigestResponse};

/// Digest responses may be cached by clients and CDNs for an hour.
pub const DIGEST_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/jstage",
        get(journal_digest)
            .post(journal_digest)
            .fallback(method_not_allowed),
    )
}

/// GET/POST /api/jstage - Latest issue and newest articles of every journal
async fn journal_digest(State(state): State<AppState>) -> impl IntoResponse {
    info!("Journal digest requested");

    let journals = state.jstage.digest().await;
    let body = DigestResponse {
        updated_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
        journals,
    };

    ([(header::CACHE_CONTROL, DIGEST_CACHE_CONTROL)], Json(body))
}
