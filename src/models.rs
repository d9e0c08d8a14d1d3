use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::llm::LLMAdapter;
use crate::search::JStageClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jstage: Arc<JStageClient>,
    /// `None` when no API key is configured; the AI route then answers 500.
    pub llm: Option<Arc<dyn LLMAdapter>>,
}

/// One article scraped from a feed entry.
///
/// Every field is best-effort: anything missing upstream is an empty string.
/// The same shape is accepted back from callers as summarization input, so
/// deserialization tolerates missing fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub title: String,
    pub authors: String,
    pub link: String,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    /// Journal (material) title as printed in the feed
    pub journal: String,
    #[serde(rename = "journalCode")]
    pub journal_code: String,
    pub volume: String,
    pub number: String,
    pub year: String,
}

impl Article {
    /// Numeric publication year; missing or malformed years sort as 0.
    pub fn year_value(&self) -> i32 {
        self.year.trim().parse().unwrap_or(0)
    }
}

// Search endpoint

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    /// Comma-separated journal codes
    pub journals: Option<String>,
    #[serde(rename = "yearFrom")]
    pub year_from: Option<String>,
    #[serde(rename = "yearTo")]
    pub year_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub total: usize,
    pub results: Vec<Article>,
}

// AI endpoint

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AiSearchRequest {
    pub action: String,
    pub query: String,
    pub articles: Option<Vec<Article>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordsResponse {
    pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub meta: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub answer: String,
    pub sources: Vec<SourceCitation>,
}

// Digest endpoint

#[derive(Debug, Clone, Serialize)]
pub struct JournalDigest {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub color: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latest_issue: String,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DigestResponse {
    pub updated_at: String,
    pub journals: Vec<JournalDigest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

// Snapshot output

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub date: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub updated: String,
    pub journals: Vec<JournalDigest>,
    pub news: Vec<NewsItem>,
}
