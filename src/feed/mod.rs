//! Feed Module
//!
//! Turns raw J-STAGE search responses into [`Article`](crate::models::Article)
//! records. Pure functions only; fetching lives in [`crate::search`].

pub mod extract;
pub mod text;

pub use extract::{compose_issue, latest_issue, parse_articles, parse_feed, ParsedFeed};
