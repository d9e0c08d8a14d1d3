//! Offline digest
//!
//! Collects the recent articles of every journal plus filtered ministry news
//! into one JSON document, for static hosting without a running server.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use tracing::info;

use crate::config::Config;
use crate::models::Snapshot;
use crate::search::{JStageClient, NewsFeed};

pub async fn build_snapshot(config: &Config) -> Snapshot {
    let now = Local::now();
    let jstage = JStageClient::new(&config.jstage);
    let news = NewsFeed::new(&config.news);

    info!("Fetching journals and news for snapshot");
    let (journals, news) = tokio::join!(jstage.snapshot(now.year() - 1), news.fetch_or_empty());

    Snapshot {
        updated: now.format("%Y-%m-%d %H:%M").to_string(),
        journals,
        news,
    }
}

pub async fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        path = %path.display(),
        journals = snapshot.journals.len(),
        news = snapshot.news.len(),
        "Snapshot written"
    );
    Ok(())
}
