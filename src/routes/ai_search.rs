//! AI search route
//!
//! `POST /api/ai-search` with `{action, query, articles?}`:
//! - `extract_keywords` asks the model for 2-3 comma-separated search terms
//! - `summarize` asks for a structured answer grounded on up to five articles,
//!   letting the model run one web search against the labour ministry site

use axum::{body::Bytes, extract::State, response::IntoResponse, response::Response, routing::post, Json, Router};
use tracing::info;

use super::method_not_allowed;
use crate::llm::prompts;
use crate::models::{AiSearchRequest, AppState, KeywordsResponse, SummaryResponse};
use crate::types::{AppError, AppResult};

pub fn routes() -> Router<AppState> {
    Router::new().route("/ai-search", post(ai_search).fallback(method_not_allowed))
}

async fn ai_search(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let llm = state.llm.clone().ok_or(AppError::MissingApiKey)?;

    let request: AiSearchRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid JSON body: {}", e)))?;

    let model = state.config.llm.model.as_str();
    let query = request.query.trim();

    match request.action.as_str() {
        "extract_keywords" => {
            require_query(query)?;
            info!(query = %query, "Extracting keywords");

            let response = llm.create_message(&prompts::keyword_request(model, query)).await?;
            let keywords = response.content.trim().to_string();

            info!(keywords = %keywords, "Extracted keywords");
            Ok(Json(KeywordsResponse { keywords }).into_response())
        }
        "summarize" => {
            require_query(query)?;
            let articles = request.articles.unwrap_or_default();
            info!(articles = articles.len(), "Summarizing");

            let response = llm
                .create_message(&prompts::synthesis_request(model, query, &articles, true))
                .await?;

            Ok(Json(SummaryResponse {
                answer: response.content,
                sources: prompts::sources_from(&articles),
            })
            .into_response())
        }
        _ => Err(AppError::InvalidRequest(
            r#"Invalid action. Use "extract_keywords" or "summarize""#.to_string(),
        )),
    }
}

fn require_query(query: &str) -> AppResult<()> {
    if query.is_empty() {
        return Err(AppError::InvalidRequest("query is required".to_string()));
    }
    Ok(())
}
