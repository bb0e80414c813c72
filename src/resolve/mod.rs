//! Page context resolution for Chapter-Ripple
//!
//! This module extracts chapter and book identifiers from reader page URLs.
//! Every function here is pure over its URL argument, so callers simply
//! re-invoke it whenever the page URL changes.

mod page;

pub use page::{resolve_page, PageInfo, PageKind};

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Query parameters that may carry a chapter id, in priority order
const CHAPTER_ID_PARAMS: &[&str] = &["chapter_id", "chapterId", "cid", "item_id", "id"];

fn reader_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/reader/(\d+)").expect("valid regex"))
}

fn trailing_digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/(\d+)(?:\?|$)").expect("valid regex"))
}

fn reader_slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/reader/\d+/([^/]+)").expect("valid regex"))
}

/// Resolves the chapter identifier of a reader page
///
/// The first match wins:
/// 1. Query parameter `chapter_id`, `chapterId`, `cid`, `item_id` or `id`
/// 2. A `/reader/<digits>` path segment
/// 3. A run of digits right before the end of the full URL (fragment
///    included) or a `?`
///
/// # Examples
///
/// ```
/// use chapter_ripple::resolve_chapter_id;
/// use url::Url;
///
/// let url = Url::parse("https://fanqienovel.com/reader/555?item_id=999").unwrap();
/// assert_eq!(resolve_chapter_id(&url), Some("999".to_string()));
///
/// let url = Url::parse("https://fanqienovel.com/reader/555").unwrap();
/// assert_eq!(resolve_chapter_id(&url), Some("555".to_string()));
/// ```
pub fn resolve_chapter_id(page_url: &Url) -> Option<String> {
    for name in CHAPTER_ID_PARAMS {
        let value = page_url
            .query_pairs()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.into_owned());
        if value.is_some() {
            return value;
        }
    }

    if let Some(caps) = reader_path_re().captures(page_url.path()) {
        return Some(caps[1].to_string());
    }

    trailing_digits_re()
        .captures(page_url.as_str())
        .map(|caps| caps[1].to_string())
}

/// Derives a human-readable chapter title from a `/reader/<id>/<slug>` URL
///
/// The slug is percent-decoded and dashes become spaces.
pub fn title_from_url(page_url: &Url) -> Option<String> {
    let caps = reader_slug_re().captures(page_url.path())?;
    let decoded = urlencoding::decode(&caps[1]).ok()?;
    let title = decoded.replace('-', " ").trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
