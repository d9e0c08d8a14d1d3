use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub jstage: JStageConfig,
    pub llm: LLMConfig,
    pub news: NewsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JStageConfig {
    /// Search API endpoint (`service=3` article search)
    pub api_url: String,
    /// Base for human-facing journal pages
    pub browse_url: String,
    pub timeout_ms: u64,
}

impl JStageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub anthropic_api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub api_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub feed_url: String,
    pub source_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
            },
            jstage: JStageConfig {
                api_url: "https://api.jstage.jst.go.jp/searchapi/do".to_string(),
                browse_url: "https://www.jstage.jst.go.jp/browse".to_string(),
                timeout_ms: 4000,
            },
            llm: LLMConfig {
                anthropic_api_key: None,
                api_url: "https://api.anthropic.com/v1/messages".to_string(),
                model: "claude-sonnet-4-20250514".to_string(),
                api_version: "2023-06-01".to_string(),
            },
            news: NewsConfig {
                feed_url: "https://www.mhlw.go.jp/stf/news.rdf".to_string(),
                source_name: "厚生労働省 新着情報".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            server: ServerConfig {
                port: match env::var("PORT") {
                    Ok(port) => port.parse()?,
                    Err(_) => defaults.server.port,
                },
                host: env::var("HOST").unwrap_or(defaults.server.host),
            },
            jstage: JStageConfig {
                api_url: env::var("JSTAGE_API_URL").unwrap_or(defaults.jstage.api_url),
                browse_url: env::var("JSTAGE_BROWSE_URL").unwrap_or(defaults.jstage.browse_url),
                timeout_ms: match env::var("JSTAGE_TIMEOUT_MS") {
                    Ok(ms) => ms.parse()?,
                    Err(_) => defaults.jstage.timeout_ms,
                },
            },
            llm: LLMConfig {
                anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                api_url: env::var("ANTHROPIC_API_URL").unwrap_or(defaults.llm.api_url),
                model: env::var("ANTHROPIC_MODEL").unwrap_or(defaults.llm.model),
                api_version: env::var("ANTHROPIC_VERSION").unwrap_or(defaults.llm.api_version),
            },
            news: NewsConfig {
                feed_url: env::var("NEWS_FEED_URL").unwrap_or(defaults.news.feed_url),
                source_name: defaults.news.source_name,
            },
        })
    }
}
