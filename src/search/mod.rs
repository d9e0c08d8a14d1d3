//! Search Module
//!
//! Upstream fetchers:
//! - J-STAGE article search (journal digest and keyword search)
//! - Labour ministry news feed (offline snapshot only)

pub mod jstage;
pub mod news;

pub use jstage::{FeedQuery, JStageClient, SearchError};
pub use news::NewsFeed;
