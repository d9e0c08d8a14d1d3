//! Ministry news feed
//!
//! Pulls the labour ministry's RSS feed and keeps only items whose title
//! touches occupational health. Used by the offline snapshot.

use std::time::Duration;

use chrono::DateTime;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use tracing::{info, warn};

use super::jstage::SearchError;
use crate::config::NewsConfig;
use crate::feed::text::clean_text;
use crate::models::NewsItem;

const NEWS_TIMEOUT: Duration = Duration::from_secs(30);
/// Only the newest items of the feed are inspected.
pub const NEWS_SCAN_LIMIT: usize = 50;
pub const NEWS_KEEP: usize = 10;

/// A title must contain at least one of these to be kept.
pub const NEWS_KEYWORDS: &[&str] = &[
    "安全衛生", "労働安全", "労働衛生", "産業保健", "産業医", "健康診断",
    "ストレスチェック", "メンタルヘルス", "過重労働", "長時間労働",
    "労災", "労働災害", "職業病", "化学物質", "有害物質", "じん肺",
    "健康経営", "治療と仕事", "両立支援", "テレワーク", "在宅勤務",
    "感染症", "熱中症", "腰痛", "VDT", "受動喫煙", "禁煙",
    "作業環境", "保護具", "安全管理", "衛生管理", "衛生委員会",
    "特殊健康診断", "一般健康診断", "定期健康診断",
    "労働基準", "36協定", "働き方改革",
];

static ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<item(?:\s[^>]*)?>(.*?)</item>").expect("valid item pattern")
});
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title>(.*?)</title>").expect("valid title pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link>(.*?)</link>").expect("valid link pattern"));
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<dc:date>(.*?)</dc:date>").expect("valid date pattern"));

fn capture(re: &Regex, xml: &str) -> String {
    re.captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .unwrap_or_default()
}

pub fn is_relevant(title: &str) -> bool {
    NEWS_KEYWORDS.iter().any(|kw| title.contains(kw))
}

/// `YYYY-MM-DD` from an RFC 3339 timestamp, or its first ten characters.
pub fn normalize_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => raw.trim().chars().take(10).collect(),
    }
}

/// Relevant items, newest first, at most [`NEWS_KEEP`].
pub fn parse_news(xml: &str, source: &str) -> Vec<NewsItem> {
    let mut news: Vec<NewsItem> = ITEM
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .take(NEWS_SCAN_LIMIT)
        .filter_map(|m| {
            let item = m.as_str();
            let title = capture(&TITLE, item);
            if title.is_empty() || !is_relevant(&title) {
                return None;
            }
            Some(NewsItem {
                title,
                link: capture(&LINK, item),
                date: normalize_date(&capture(&DATE, item)),
                source: source.to_string(),
            })
        })
        .collect();

    news.sort_by(|a, b| b.date.cmp(&a.date));
    news.truncate(NEWS_KEEP);
    news
}

pub struct NewsFeed {
    client: Client,
    url: String,
    source: String,
}

impl NewsFeed {
    pub fn new(config: &NewsConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.feed_url.clone(),
            source: config.source_name.clone(),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<NewsItem>, SearchError> {
        let request = async {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| SearchError::RequestFailed(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(SearchError::Status(status.as_u16()));
            }
            response
                .text()
                .await
                .map_err(|e| SearchError::RequestFailed(e.to_string()))
        };

        let xml = tokio::time::timeout(NEWS_TIMEOUT, request)
            .await
            .map_err(|_| SearchError::Timeout(NEWS_TIMEOUT))??;

        let news = parse_news(&xml, &self.source);
        info!(count = news.len(), source = %self.source, "News feed parsed");
        Ok(news)
    }

    /// Like [`fetch`](Self::fetch) but a failed feed is just empty.
    pub async fn fetch_or_empty(&self) -> Vec<NewsItem> {
        self.fetch().await.unwrap_or_else(|e| {
            warn!(source = %self.source, error = %e, "News feed fetch failed");
            Vec::new()
        })
    }
}
