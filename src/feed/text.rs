//! Text cleanup and truncation policies applied to every extracted field.

use regex::Regex;
use std::sync::LazyLock;

/// Titles are cut to this many characters, without a marker.
pub const TITLE_LIMIT: usize = 100;
/// Titles shorter than this are treated as noise and the entry is dropped.
pub const TITLE_MIN_CHARS: usize = 4;
/// Author summaries longer than this are shortened.
pub const AUTHORS_LIMIT: usize = 40;
pub const ABSTRACT_LIMIT: usize = 300;

pub const ELLIPSIS: &str = "...";
/// Appended after the first author when the list is shortened.
pub const OTHERS_MARKER: &str = " 他";

const AUTHOR_SEPARATORS: [char; 4] = [',', '、', '，', '\n'];

static CDATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!\[CDATA\[([\s\S]*?)\]\]>").expect("valid CDATA pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// Remove `<![CDATA[ ... ]]>` wrappers, keeping the wrapped text.
pub fn unwrap_cdata(raw: &str) -> String {
    CDATA
        .replace_all(raw, "$1")
        .replace("<![CDATA[", "")
        .replace("]]>", "")
}

/// Contents of every CDATA section, cleaned, empty ones skipped.
pub fn cdata_segments(raw: &str) -> Vec<String> {
    CDATA
        .captures_iter(raw)
        .filter_map(|c| c.get(1))
        .map(|m| strip_tags(m.as_str()).trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Remove inline markup such as `<i>` or `<sup>`.
pub fn strip_tags(raw: &str) -> String {
    TAG.replace_all(raw, "").into_owned()
}

/// CDATA unwrap, tag strip and trim.
pub fn clean_text(raw: &str) -> String {
    strip_tags(&unwrap_cdata(raw)).trim().to_string()
}

/// Keep at most `limit` characters; append `marker` only when something was cut.
pub fn truncate(s: &str, limit: usize, marker: &str) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let mut out: String = s.chars().take(limit).collect();
    out.push_str(marker);
    out
}

pub fn truncate_title(title: &str) -> String {
    truncate(title, TITLE_LIMIT, "")
}

pub fn truncate_abstract(text: &str) -> String {
    truncate(text, ABSTRACT_LIMIT, ELLIPSIS)
}

/// Collapse an author list into a short byline.
///
/// Three or more names become `"{first} 他"`. Otherwise the names are joined
/// with `", "`; if that exceeds [`AUTHORS_LIMIT`] it is shortened to the first
/// name plus the marker when it splits into several names, or cut to the
/// limit with an ellipsis when it does not.
pub fn summarize_authors(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [first, _, _, ..] => format!("{first}{OTHERS_MARKER}"),
        _ => {
            let joined = names.join(", ");
            if joined.chars().count() <= AUTHORS_LIMIT {
                return joined;
            }
            let parts: Vec<&str> = joined
                .split(AUTHOR_SEPARATORS)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            if parts.len() > 1 {
                format!("{}{}", parts[0], OTHERS_MARKER)
            } else {
                truncate(&joined, AUTHORS_LIMIT, ELLIPSIS)
            }
        }
    }
}
