use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Host whose book pages carry the book id as a query parameter
const PARTNER_HOST: &str = "changdunovel.com";

/// Kind of page a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Book detail page
    Page,
    /// Chapter reader page
    Reader,
}

/// The book a page belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub kind: PageKind,
    pub book_id: String,
}

fn page_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/page/(\d+)$").expect("valid regex"))
}

fn reader_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/reader/(\d+)").expect("valid regex"))
}

fn partner_book_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"book_id=(\d{19})").expect("valid regex"))
}

/// Identifies the book behind a page URL
///
/// Supports `/page/<id>` detail pages, `/reader/<id>` reader pages and the
/// partner host's `book_id=<19 digits>` form. Returns `None` for anything else.
pub fn resolve_page(page_url: &Url) -> Option<PageInfo> {
    let path = page_url.path();

    if let Some(caps) = page_path_re().captures(path) {
        return Some(PageInfo {
            kind: PageKind::Page,
            book_id: caps[1].to_string(),
        });
    }

    if let Some(caps) = reader_path_re().captures(path) {
        return Some(PageInfo {
            kind: PageKind::Reader,
            book_id: caps[1].to_string(),
        });
    }

    if page_url.host_str() == Some(PARTNER_HOST) {
        if let Some(caps) = partner_book_re().captures(page_url.as_str()) {
            return Some(PageInfo {
                kind: PageKind::Page,
                book_id: caps[1].to_string(),
            });
        }
    }

    None
}
