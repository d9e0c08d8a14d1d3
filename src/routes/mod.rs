//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/api/jstage` - Six-journal digest (GET, POST)
//! - `/api/jstage-search` - Keyword search across journals (GET, POST)
//! - `/api/ai-search` - Keyword extraction and answer synthesis (POST)
//! - `/api/health` - Health checks
//!
//! The same routes are mirrored under `/.netlify/functions/` for front ends
//! that still call the old function paths.

pub mod ai_search;
pub mod health;
pub mod jstage;
pub mod search;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::{cors_layer, json_content_type_layer};
use crate::models::AppState;
use crate::types::AppError;

pub const API_PREFIX: &str = "/api";
pub const NETLIFY_PREFIX: &str = "/.netlify/functions";

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(jstage::routes())
        .merge(search::routes())
        .merge(ai_search::routes())
        .merge(health::routes())
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .nest(API_PREFIX, api_routes())
        .nest(NETLIFY_PREFIX, api_routes())
        .with_state(state)
        .layer(cors_layer())
        .layer(json_content_type_layer())
        .layer(TraceLayer::new_for_http())
}

/// Fallback for methods a route does not serve
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}


#[cfg(test)]
mod tests {
    use super::test_support::{send, state, UNREACHABLE};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };

    #[tokio::test]
    async fn test_options_preflight_on_every_route() {
        for uri in [
            "/api/jstage",
            "/api/jstage-search",
            "/api/ai-search",
            "/.netlify/functions/ai-search",
        ] {
            let request = Request::builder()
                .method("OPTIONS")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (response, body) = send(state(UNREACHABLE, None), request).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(body, serde_json::Value::Null, "{uri}");
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                "*",
                "{uri}"
            );
            assert!(
                response.headers()[header::CONTENT_TYPE]
                    .to_str()
                    .unwrap()
                    .starts_with("application/json"),
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (response, body) = send(state(UNREACHABLE, None), request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
