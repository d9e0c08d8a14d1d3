//! J-STAGE Search API Client
//!
//! Issues `service=3` article searches against the J-STAGE Web API and runs
//! the responses through [`crate::feed`].
//!
//! ## Failure Model
//!
//! Each request is bounded by the configured timeout and never retried.
//! When several journals are queried they are fetched concurrently and the
//! caller waits for all of them; a journal whose fetch fails contributes an
//! empty result instead of failing the whole request.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::JStageConfig;
use crate::feed::{parse_feed, ParsedFeed};
use crate::journals::{default_codes, JournalDescriptor, JOURNALS};
use crate::models::{Article, JournalDigest, SearchParams};

/// `service=3`: article search
const SERVICE_ARTICLE_SEARCH: &str = "3";
/// Entries requested per journal for the digest
pub const DIGEST_FETCH_COUNT: u32 = 5;
/// Articles kept per journal in the digest
pub const DIGEST_KEEP: usize = 3;
/// Entries requested per journal for keyword search
pub const SEARCH_FETCH_COUNT: u32 = 100;
/// Entries requested and kept per journal in an offline snapshot
pub const SNAPSHOT_COUNT: u32 = 5;
/// `sortflg=2`: newest first
pub const SORT_NEWEST: u8 = 2;

/// Errors that can occur while fetching a feed
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("J-STAGE request timed out after {0:?}")]
    Timeout(Duration),

    #[error("J-STAGE request failed: {0}")]
    RequestFailed(String),

    #[error("J-STAGE returned HTTP {0}")]
    Status(u16),
}

/// Parameters of one upstream search call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedQuery {
    pub journal: String,
    pub keyword: Option<String>,
    pub count: u32,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub sort: Option<u8>,
}

impl FeedQuery {
    pub fn latest(journal: &str, count: u32) -> Self {
        Self {
            journal: journal.to_string(),
            count,
            ..Default::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("service", SERVICE_ARTICLE_SEARCH.to_string()),
            ("cdjournal", self.journal.clone()),
        ];
        if let Some(keyword) = &self.keyword {
            pairs.push(("text", keyword.clone()));
        }
        pairs.push(("count", self.count.to_string()));
        if let Some(from) = &self.year_from {
            pairs.push(("pubyearfrom", from.clone()));
        }
        if let Some(to) = &self.year_to {
            pairs.push(("pubyearto", to.clone()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sortflg", sort.to_string()));
        }
        pairs
    }
}

pub struct JStageClient {
    client: Client,
    api_url: String,
    browse_url: String,
    timeout: Duration,
}

impl JStageClient {
    pub fn new(config: &JStageConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.clone(),
            browse_url: config.browse_url.clone(),
            timeout: config.timeout(),
        }
    }

    /// Fetch the raw feed text for one query.
    pub async fn fetch_feed(&self, query: &FeedQuery) -> Result<String, SearchError> {
        debug!(journal = %query.journal, "Fetching J-STAGE feed");

        let request = async {
            let response = self
                .client
                .get(&self.api_url)
                .query(&query.query_pairs())
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

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| SearchError::Timeout(self.timeout))?
    }

    /// Fetch and parse; any failure is logged and becomes `None`.
    async fn fetch_parsed(&self, query: &FeedQuery) -> Option<ParsedFeed> {
        match self.fetch_feed(query).await {
            Ok(xml) => Some(parse_feed(&xml)),
            Err(e) => {
                warn!(journal = %query.journal, error = %e, "J-STAGE fetch failed");
                None
            }
        }
    }

    fn digest_entry(
        &self,
        journal: &JournalDescriptor,
        feed: Option<ParsedFeed>,
        keep: usize,
        with_description: bool,
    ) -> JournalDigest {
        let ParsedFeed {
            mut articles,
            latest_issue,
        } = feed.unwrap_or_default();
        articles.truncate(keep);
        for article in &mut articles {
            article.journal_code = journal.code.to_string();
        }

        JournalDigest {
            id: journal.id.to_string(),
            name: journal.name.to_string(),
            publisher: journal.publisher.to_string(),
            color: journal.color.to_string(),
            url: journal.browse_url(&self.browse_url),
            description: with_description.then(|| journal.description.to_string()),
            latest_issue,
            articles,
        }
    }

    /// Latest issue line and newest articles for every configured journal,
    /// in table order. Always returns one entry per journal.
    pub async fn digest(&self) -> Vec<JournalDigest> {
        let fetches = JOURNALS.iter().map(|journal| async move {
            let feed = self
                .fetch_parsed(&FeedQuery::latest(journal.code, DIGEST_FETCH_COUNT))
                .await;
            self.digest_entry(journal, feed, DIGEST_KEEP, false)
        });
        let journals = join_all(fetches).await;

        info!(
            populated = journals.iter().filter(|j| !j.articles.is_empty()).count(),
            "Journal digest assembled"
        );
        journals
    }

    /// Articles from the last `year_from` onwards, newest first, with descriptions.
    pub async fn snapshot(&self, year_from: i32) -> Vec<JournalDigest> {
        let fetches = JOURNALS.iter().map(|journal| async move {
            let query = FeedQuery {
                year_from: Some(year_from.to_string()),
                sort: Some(SORT_NEWEST),
                ..FeedQuery::latest(journal.code, SNAPSHOT_COUNT)
            };
            let feed = self.fetch_parsed(&query).await;
            self.digest_entry(journal, feed, SNAPSHOT_COUNT as usize, true)
        });
        join_all(fetches).await
    }

    /// Keyword search across the requested journals, merged and sorted by
    /// year, newest first.
    pub async fn search(&self, keyword: &str, params: &SearchParams) -> Vec<Article> {
        let codes: Vec<String> = match params.journals.as_deref() {
            Some(list) if !list.trim().is_empty() => list
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            _ => default_codes(),
        };

        info!(keyword = %keyword, journals = codes.len(), "Searching J-STAGE");

        let fetches = codes.iter().map(|code| async move {
            let query = FeedQuery {
                keyword: Some(keyword.to_string()),
                year_from: params.year_from.clone().filter(|y| !y.is_empty()),
                year_to: params.year_to.clone().filter(|y| !y.is_empty()),
                ..FeedQuery::latest(code, SEARCH_FETCH_COUNT)
            };
            let mut articles = self
                .fetch_parsed(&query)
                .await
                .map(|feed| feed.articles)
                .unwrap_or_default();
            for article in &mut articles {
                article.journal_code = code.clone();
            }
            articles
        });

        let mut results: Vec<Article> = join_all(fetches).await.into_iter().flatten().collect();
        results.sort_by_key(|a| std::cmp::Reverse(a.year_value()));

        info!(count = results.len(), "J-STAGE search completed");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn feed(title: &str, volume: &str, number: &str, year: &str) -> String {
        format!(
            r#"<feed><result><status>0</status></result>
<entry>
  <article_title><ja><![CDATA[{title}]]></ja></article_title>
  <author><ja><name><![CDATA[山田 太郎]]></name></ja></author>
  <prism:volume>{volume}</prism:volume><prism:number>{number}</prism:number><pubyear>{year}</pubyear>
  <link href="https://example.org/{volume}"/>
</entry>
<entry><article_title><ja><![CDATA[{title} 続報]]></ja></article_title><pubyear>{year}</pubyear></entry>
<entry><article_title><ja><![CDATA[{title} 第三報]]></ja></article_title><pubyear>{year}</pubyear></entry>
<entry><article_title><ja><![CDATA[{title} 第四報]]></ja></article_title><pubyear>{year}</pubyear></entry>
</feed>"#
        )
    }

    fn client_for(server: &ServerGuard) -> JStageClient {
        JStageClient::new(&JStageConfig {
            api_url: format!("{}/searchapi/do", server.url()),
            browse_url: "https://www.jstage.jst.go.jp/browse".to_string(),
            timeout_ms: 4000,
        })
    }

    #[test]
    fn test_query_pairs() {
        let query = FeedQuery {
            journal: "jjomh".to_string(),
            keyword: Some("ストレス".to_string()),
            count: 100,
            year_from: Some("2020".to_string()),
            year_to: None,
            sort: Some(SORT_NEWEST),
        };
        assert_eq!(
            query.query_pairs(),
            vec![
                ("service", "3".to_string()),
                ("cdjournal", "jjomh".to_string()),
                ("text", "ストレス".to_string()),
                ("count", "100".to_string()),
                ("pubyearfrom", "2020".to_string()),
                ("sortflg", "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_digest_survives_one_failing_journal() {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();
        for journal in JOURNALS.iter() {
            let mock = server
                .mock("GET", "/searchapi/do")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("cdjournal".to_string(), journal.code.to_string()),
                    Matcher::UrlEncoded("count".to_string(), "5".to_string()),
                ]));
            let mock = if journal.code == "jjomh" {
                mock.with_status(500).with_body("upstream down")
            } else {
                mock.with_status(200).with_body(feed("職場のメンタルヘルス", "38", "2", "2024"))
            };
            mocks.push(mock.expect(1).create_async().await);
        }

        let digest = client_for(&server).digest().await;

        assert_eq!(digest.len(), 6);
        for (entry, journal) in digest.iter().zip(JOURNALS.iter()) {
            assert_eq!(entry.id, journal.id);
            if journal.code == "jjomh" {
                assert!(entry.articles.is_empty());
                assert_eq!(entry.latest_issue, "");
            } else {
                assert_eq!(entry.articles.len(), DIGEST_KEEP);
                assert_eq!(entry.latest_issue, "2024年 38巻2号");
                assert_eq!(entry.articles[0].authors, "山田 太郎");
                assert_eq!(entry.articles[0].journal_code, journal.code);
            }
            assert!(entry.description.is_none());
        }
        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_search_merges_and_sorts_by_year() {
        let mut server = Server::new_async().await;
        let _old = server
            .mock("GET", "/searchapi/do")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cdjournal".to_string(), "sangyoeisei".to_string()),
                Matcher::UrlEncoded("text".to_string(), "腰痛".to_string()),
                Matcher::UrlEncoded("pubyearfrom".to_string(), "2019".to_string()),
            ]))
            .with_body(feed("腰痛と作業姿勢", "61", "1", "2019"))
            .create_async()
            .await;
        let _new = server
            .mock("GET", "/searchapi/do")
            .match_query(Matcher::UrlEncoded("cdjournal".to_string(), "indhealth".to_string()))
            .with_body(feed("Low back pain in nurses", "62", "3", "2024"))
            .create_async()
            .await;

        let params = SearchParams {
            keyword: Some("腰痛".to_string()),
            journals: Some("sangyoeisei, indhealth".to_string()),
            year_from: Some("2019".to_string()),
            year_to: None,
        };
        let results = client_for(&server).search("腰痛", &params).await;

        assert_eq!(results.len(), 8);
        assert_eq!(results[0].year, "2024");
        assert_eq!(results[0].journal_code, "indhealth");
        assert_eq!(results[7].year, "2019");
        assert_eq!(results[7].journal_code, "sangyoeisei");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let client = JStageClient::new(&JStageConfig {
            api_url: "http://127.0.0.1:9/searchapi/do".to_string(),
            browse_url: "https://www.jstage.jst.go.jp/browse".to_string(),
            timeout_ms: 1000,
        });
        let result = client.fetch_feed(&FeedQuery::latest("jaohl", 5)).await;
        assert!(matches!(
            result,
            Err(SearchError::RequestFailed(_)) | Err(SearchError::Timeout(_))
        ));
    }

    /// Accepts connections and holds them open without ever answering.
    async fn silent_upstream() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}/searchapi/do")
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out() {
        let client = JStageClient::new(&JStageConfig {
            api_url: silent_upstream().await,
            browse_url: "https://www.jstage.jst.go.jp/browse".to_string(),
            timeout_ms: 300,
        });

        let result = client.fetch_feed(&FeedQuery::latest("jaohl", 5)).await;
        assert!(matches!(result, Err(SearchError::Timeout(d)) if d == Duration::from_millis(300)));

        // All six journals wait on the same bound concurrently, not one after another.
        let started = std::time::Instant::now();
        let digest = client.digest().await;
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
        assert_eq!(digest.len(), 6);
        assert!(digest.iter().all(|j| j.articles.is_empty() && j.latest_issue.is_empty()));
    }

    #[tokio::test]
    async fn test_snapshot_requests_recent_sorted_entries() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/searchapi/do")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pubyearfrom".to_string(), "2025".to_string()),
                Matcher::UrlEncoded("sortflg".to_string(), "2".to_string()),
            ]))
            .with_body(feed("化学物質管理の新制度", "67", "1", "2025"))
            .expect(6)
            .create_async()
            .await;

        let journals = client_for(&server).snapshot(2025).await;
        assert_eq!(journals.len(), 6);
        assert_eq!(journals[0].articles.len(), 4);
        assert!(journals[0].description.as_deref().unwrap().contains("産業保健"));
    }
}
