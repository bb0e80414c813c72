//! API response normalization
//!
//! This module turns a raw content API response into a canonical
//! (title, body) pair:
//! - Envelope extraction for the supported JSON shapes
//! - Pluggable title heuristics for plain-text and markup content
//! - Body formatting for TXT export or reading-pane markup

mod envelope;
mod format;
mod title;

pub use envelope::{extract_content, ResponseShape};
pub use format::{decode_entities, format_content, FormatTarget, PARAGRAPH_INDENT};
pub use title::{MarkupHeading, PlainHeading, TitleSplit, TitleStrategy, MAX_TITLE_CHARS};

use crate::resolve::title_from_url;
use url::Url;

/// Title used when nothing better is known
pub const UNKNOWN_CHAPTER_TITLE: &str = "未知章节";

/// Everything known about a chapter besides its content, used to build a
/// fallback title
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleContext<'a> {
    pub chapter_id: Option<&'a str>,
    pub fallback_title: Option<&'a str>,
    pub page_url: Option<&'a Url>,
}

impl TitleContext<'_> {
    /// Resolves the deterministic fallback title
    ///
    /// In order: the caller's fallback title, `第<id>章`, a title derived
    /// from the page URL, then [`UNKNOWN_CHAPTER_TITLE`].
    pub fn fallback(&self) -> String {
        if let Some(title) = self.fallback_title.map(str::trim).filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        if let Some(id) = self.chapter_id.filter(|id| !id.is_empty()) {
            return format!("第{}章", id);
        }
        self.page_url
            .and_then(title_from_url)
            .unwrap_or_else(|| UNKNOWN_CHAPTER_TITLE.to_string())
    }
}

/// A normalized chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    /// Unformatted body, still plain text or markup like the input
    pub content: String,
}

/// Extracts titles and bodies with swappable heuristics
///
/// Extraction never fails: when a heuristic finds nothing, the title degrades
/// to the deterministic fallback of the [`TitleContext`].
pub struct Normalizer {
    plain: Box<dyn TitleStrategy>,
    markup: Box<dyn TitleStrategy>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Creates a normalizer with the default heuristics
    pub fn new() -> Self {
        Self::with_strategies(Box::new(PlainHeading), Box::new(MarkupHeading))
    }

    /// Creates a normalizer with custom heuristics for each content kind
    pub fn with_strategies(
        plain: Box<dyn TitleStrategy>,
        markup: Box<dyn TitleStrategy>,
    ) -> Self {
        Self { plain, markup }
    }

    /// Splits raw API content into a title and a body
    ///
    /// # Arguments
    ///
    /// * `raw` - Content string taken from the API envelope
    /// * `is_plain_text` - Whether `raw` is plain text rather than markup
    /// * `has_embedded_title` - Whether `raw` starts with its own title
    /// * `context` - Identifiers used to build a fallback title
    pub fn extract(
        &self,
        raw: &str,
        is_plain_text: bool,
        has_embedded_title: bool,
        context: &TitleContext<'_>,
    ) -> Extracted {
        if !has_embedded_title {
            return Extracted {
                title: context.fallback(),
                content: raw.to_string(),
            };
        }

        let strategy = if is_plain_text {
            &self.plain
        } else {
            &self.markup
        };
        let split = strategy.split(raw);

        match split.title {
            Some(title) => Extracted {
                title,
                content: split.body,
            },
            None => {
                tracing::trace!(
                    chapter_id = ?context.chapter_id,
                    "No embedded title detected, using fallback"
                );
                Extracted {
                    title: context.fallback(),
                    content: split.body,
                }
            }
        }
    }
}
