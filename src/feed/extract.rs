//! Pattern-based field extraction over J-STAGE search feeds.
//!
//! The feed is Atom-like but loosely structured: fields may be wrapped in
//! CDATA, carry inline markup, or come as parallel `<ja>`/`<en>` children.
//! Nothing here performs I/O and nothing fails; a missing field is an empty
//! string and an unusable feed is an empty list.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use super::text::{
    cdata_segments, clean_text, summarize_authors, truncate_abstract, truncate_title,
    TITLE_MIN_CHARS,
};
use crate::models::Article;

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<entry(?:\s[^>]*)?>(.*?)</entry>").expect("valid entry pattern")
});
static STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<status>\s*(\d+)\s*</status>").expect("valid status pattern")
});
static LINK_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<link\b[^>]*?\bhref\s*=\s*"([^"]*)""#).expect("valid link pattern")
});
/// Element patterns compiled once per tag name.
static ELEMENT_PATTERNS: LazyLock<Mutex<HashMap<String, Arc<Regex>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Articles plus the issue line taken from the most recent entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub articles: Vec<Article>,
    pub latest_issue: String,
}

pub fn parse_feed(xml: &str) -> ParsedFeed {
    ParsedFeed {
        articles: parse_articles(xml),
        latest_issue: latest_issue(xml),
    }
}

/// Every usable entry in feed order.
///
/// Entries whose title is missing or shorter than [`TITLE_MIN_CHARS`] are
/// skipped. A feed reporting a non-zero `<status>` yields nothing.
pub fn parse_articles(xml: &str) -> Vec<Article> {
    if !status_ok(xml) {
        return Vec::new();
    }
    entries(xml).filter_map(parse_entry).collect()
}

/// `"{year}年 {volume}巻{number}号"` for the first entry, or empty.
pub fn latest_issue(xml: &str) -> String {
    if !status_ok(xml) {
        return String::new();
    }
    match entries(xml).next() {
        Some(entry) => compose_issue(&entry_year(entry), &entry_volume(entry), &entry_number(entry)),
        None => String::new(),
    }
}

/// Volume is required; year and number are dropped when absent.
pub fn compose_issue(year: &str, volume: &str, number: &str) -> String {
    if volume.is_empty() {
        return String::new();
    }
    let mut issue = String::new();
    if !year.is_empty() {
        issue.push_str(year);
        issue.push_str("年 ");
    }
    issue.push_str(volume);
    issue.push('巻');
    if !number.is_empty() {
        issue.push_str(number);
        issue.push('号');
    }
    issue
}

fn status_ok(xml: &str) -> bool {
    STATUS
        .captures(xml)
        .and_then(|c| c.get(1))
        .map_or(true, |m| m.as_str() == "0")
}

fn entries(xml: &str) -> impl Iterator<Item = &str> {
    ENTRY
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

fn parse_entry(entry: &str) -> Option<Article> {
    let title = entry_title(entry);
    if title.chars().count() < TITLE_MIN_CHARS {
        return None;
    }

    let abstract_text = localized(entry, "abstract");

    Some(Article {
        title: truncate_title(&title),
        authors: summarize_authors(&author_names(entry)),
        link: entry_link(entry),
        abstract_text: (!abstract_text.is_empty()).then(|| truncate_abstract(&abstract_text)),
        journal: localized(entry, "material_title"),
        journal_code: String::new(),
        volume: entry_volume(entry),
        number: entry_number(entry),
        year: entry_year(entry),
    })
}

fn entry_title(entry: &str) -> String {
    let title = localized(entry, "article_title");
    if !title.is_empty() {
        return title;
    }
    // Plain Atom title; J-STAGE sometimes puts a URL here.
    let title = text_of(entry, "title");
    if title.starts_with("http") {
        String::new()
    } else {
        title
    }
}

fn author_names(entry: &str) -> Vec<String> {
    if let Some(block) = inner(entry, "author") {
        let lang_block = ["ja", "en"]
            .iter()
            .filter_map(|lang| inner(block, lang))
            .find(|b| !clean_text(b).is_empty())
            .unwrap_or(block);

        let mut names: Vec<String> = all_inner(lang_block, "name")
            .into_iter()
            .chain(all_inner(lang_block, "n"))
            .map(clean_text)
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            names = cdata_segments(lang_block);
        }
        if names.is_empty() {
            let raw = clean_text(lang_block);
            if !raw.is_empty() {
                names.push(raw);
            }
        }
        if !names.is_empty() {
            return names;
        }
    }

    let creator = first_text(entry, &["dc:creator", "creator"]);
    if creator.is_empty() {
        Vec::new()
    } else {
        vec![creator]
    }
}

fn entry_link(entry: &str) -> String {
    let link = localized(entry, "article_link");
    if !link.is_empty() {
        return link;
    }
    LINK_HREF
        .captures(entry)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn entry_volume(entry: &str) -> String {
    first_text(entry, &["prism:volume", "volume"])
}

fn entry_number(entry: &str) -> String {
    first_text(entry, &["prism:number", "number"])
}

fn entry_year(entry: &str) -> String {
    let year = text_of(entry, "pubyear");
    if !year.is_empty() {
        return year;
    }
    text_of(entry, "prism:publicationDate").chars().take(4).collect()
}

/// Prefer the `<ja>` child of `tag`, then `<en>`, then the element's own text.
fn localized(xml: &str, tag: &str) -> String {
    let Some(block) = inner(xml, tag) else {
        return String::new();
    };
    ["ja", "en"]
        .iter()
        .map(|lang| text_of(block, lang))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| clean_text(block))
}

fn first_text(xml: &str, tags: &[&str]) -> String {
    tags.iter()
        .map(|tag| text_of(xml, tag))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn text_of(xml: &str, tag: &str) -> String {
    inner(xml, tag).map(clean_text).unwrap_or_default()
}

fn element_pattern(tag: &str) -> Option<Arc<Regex>> {
    let mut patterns = ELEMENT_PATTERNS.lock().ok()?;
    if let Some(re) = patterns.get(tag) {
        return Some(Arc::clone(re));
    }
    let escaped = regex::escape(tag);
    let re = Arc::new(Regex::new(&format!(r"(?is)<{escaped}(?:\s[^>]*)?>(.*?)</{escaped}>")).ok()?);
    patterns.insert(tag.to_string(), Arc::clone(&re));
    Some(re)
}

/// Inner text of the first `<tag>` element.
fn inner<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    element_pattern(tag)?
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn all_inner<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    match element_pattern(tag) {
        Some(re) => re
            .captures_iter(xml)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect(),
        None => Vec::new(),
    }
}
