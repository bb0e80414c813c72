//! Title detection heuristics
//!
//! Heading detection is fuzzy by nature, so each heuristic is a separate
//! [`TitleStrategy`] that can be swapped out or tested on its own.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Lines or elements longer than this are never treated as a title
pub const MAX_TITLE_CHARS: usize = 100;

/// Number of leading elements of the content region scanned for a heading
const LEADING_WINDOW: usize = 3;

/// Outcome of running a title heuristic over raw chapter content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSplit {
    /// Detected title, if the heuristic found one
    pub title: Option<String>,
    /// Content with the detected title removed
    pub body: String,
}

impl TitleSplit {
    fn untitled(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
        }
    }
}

/// A heuristic that separates an embedded title from chapter content
pub trait TitleStrategy: Send + Sync {
    fn split(&self, raw: &str) -> TitleSplit;
}

fn chapter_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^第.+章").expect("valid regex"))
}

/// Plain-text heuristic: the first non-empty line is the title when it looks
/// like a `第…章` heading or is shorter than [`MAX_TITLE_CHARS`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHeading;

impl TitleStrategy for PlainHeading {
    fn split(&self, raw: &str) -> TitleSplit {
        let lines: Vec<&str> = raw.lines().collect();
        let Some(pos) = lines.iter().position(|line| !line.trim().is_empty()) else {
            return TitleSplit::untitled(raw);
        };

        let candidate = lines[pos].trim();
        let is_heading = chapter_heading_re().is_match(candidate)
            || candidate.chars().count() < MAX_TITLE_CHARS;
        if !is_heading {
            return TitleSplit::untitled(raw);
        }

        TitleSplit {
            title: Some(candidate.to_string()),
            body: lines[pos + 1..].join("\n"),
        }
    }
}

/// Markup heuristic
///
/// A leading `<header>` wins (its `.tt-title` child preferred). Otherwise the
/// first few elements of the main region (`<article>` or the whole fragment)
/// are scanned for an `h1`-`h3` or an element whose class mentions "title".
/// The body is the inner markup of the main region with the title removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupHeading;

impl TitleStrategy for MarkupHeading {
    fn split(&self, raw: &str) -> TitleSplit {
        let mut fragment = Html::parse_fragment(raw);

        let found = header_title(&fragment).or_else(|| leading_heading(&fragment));
        let title = found.map(|(node_id, title)| {
            if let Some(mut node) = fragment.tree.get_mut(node_id) {
                node.detach();
            }
            title
        });

        TitleSplit {
            title,
            body: main_region_html(&fragment),
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn header_title(fragment: &Html) -> Option<(ego_tree::NodeId, String)> {
    let header = fragment.select(&selector("header")?).next()?;
    let title = selector(".tt-title")
        .and_then(|sel| header.select(&sel).next())
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| element_text(&header));

    if title.is_empty() {
        None
    } else {
        Some((header.id(), title))
    }
}

fn leading_heading(fragment: &Html) -> Option<(ego_tree::NodeId, String)> {
    let region = main_region(fragment);
    region
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .take(LEADING_WINDOW)
        .find_map(|el| {
            if !is_heading_like(&el) {
                return None;
            }
            let text = element_text(&el);
            let len = text.chars().count();
            (len > 0 && len <= MAX_TITLE_CHARS).then(|| (el.id(), text))
        })
}

fn is_heading_like(element: &ElementRef) -> bool {
    let value = element.value();
    matches!(value.name(), "h1" | "h2" | "h3")
        || value
            .attr("class")
            .map(|class| class.to_lowercase().contains("title"))
            .unwrap_or(false)
}

fn main_region(fragment: &Html) -> ElementRef<'_> {
    selector("article")
        .and_then(|sel| fragment.select(&sel).next())
        .unwrap_or_else(|| fragment.root_element())
}

fn main_region_html(fragment: &Html) -> String {
    main_region(fragment).inner_html().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_chapter_heading() {
        let split = PlainHeading.split("第12章 风起\n正文第一行\n正文第二行");
        assert_eq!(split.title.as_deref(), Some("第12章 风起"));
        assert_eq!(split.body, "正文第一行\n正文第二行");
    }

    #[test]
    fn test_plain_skips_leading_blank_lines() {
        let split = PlainHeading.split("\n\n  Prologue  \nbody");
        assert_eq!(split.title.as_deref(), Some("Prologue"));
        assert_eq!(split.body, "body");
    }

    #[test]
    fn test_plain_long_first_line_is_not_a_title() {
        let long_line = "很".repeat(120);
        let raw = format!("{}\nsecond", long_line);
        let split = PlainHeading.split(&raw);
        assert_eq!(split.title, None);
        assert_eq!(split.body, raw);
    }

    #[test]
    fn test_plain_long_chapter_heading_still_matches() {
        let heading = format!("第1章 {}", "长".repeat(120));
        let split = PlainHeading.split(&format!("{}\nbody", heading));
        assert_eq!(split.title, Some(heading));
    }

    #[test]
    fn test_plain_empty_content() {
        let split = PlainHeading.split("   \n  ");
        assert_eq!(split.title, None);
    }

    #[test]
    fn test_markup_header_with_tt_title() {
        let raw = r#"<header><div class="tt-title">第3章 夜行</div><span>2024</span></header><article><p>一</p><p>二</p></article>"#;
        let split = MarkupHeading.split(raw);
        assert_eq!(split.title.as_deref(), Some("第3章 夜行"));
        assert_eq!(split.body, "<p>一</p><p>二</p>");
    }

    #[test]
    fn test_markup_header_text() {
        let raw = "<header> Chapter One </header><p>text</p>";
        let split = MarkupHeading.split(raw);
        assert_eq!(split.title.as_deref(), Some("Chapter One"));
        assert!(!split.body.contains("header"));
        assert!(split.body.contains("<p>text</p>"));
    }

    #[test]
    fn test_markup_leading_heading_in_article() {
        let raw = "<article><h2>第5章 归来</h2><p>正文</p></article>";
        let split = MarkupHeading.split(raw);
        assert_eq!(split.title.as_deref(), Some("第5章 归来"));
        assert_eq!(split.body, "<p>正文</p>");
    }

    #[test]
    fn test_markup_title_class() {
        let raw = r#"<div class="chapter-Title">Interlude</div><p>body</p>"#;
        let split = MarkupHeading.split(raw);
        assert_eq!(split.title.as_deref(), Some("Interlude"));
    }

    #[test]
    fn test_markup_heading_outside_window_ignored() {
        let raw = "<p>a</p><p>b</p><p>c</p><h1>Late</h1>";
        let split = MarkupHeading.split(raw);
        assert_eq!(split.title, None);
        assert!(split.body.contains("<h1>Late</h1>"));
    }

    #[test]
    fn test_markup_without_title() {
        let split = MarkupHeading.split("<p>only text</p>");
        assert_eq!(split.title, None);
        assert_eq!(split.body, "<p>only text</p>");
    }
}
