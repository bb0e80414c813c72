//! Body formatting for the two output targets
//!
//! Markup converted to plain text is lossy: tags, links and emphasis are
//! discarded, so the transform only runs in that one direction.

use regex::Regex;
use std::sync::OnceLock;

/// Indentation placed before every paragraph of plain-text output
pub const PARAGRAPH_INDENT: &str = "  ";

/// Where formatted content ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTarget {
    /// Line-delimited text for TXT export
    PlainText,
    /// Paragraph markup for a reading pane
    Markup,
}

struct Patterns {
    header: Regex,
    article: Regex,
    footer: Regex,
    empty_paragraph: Regex,
    paragraph_open: Regex,
    paragraph_close: Regex,
    line_break: Regex,
    any_tag: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        header: Regex::new(r"(?is)<header[^>]*>.*?</header>").expect("valid regex"),
        article: Regex::new(r"(?i)</?article[^>]*>").expect("valid regex"),
        footer: Regex::new(r"(?is)<footer[^>]*>.*$").expect("valid regex"),
        empty_paragraph: Regex::new(r"<p>\s*</p>").expect("valid regex"),
        paragraph_open: Regex::new(r"(?i)<p(\s[^>]*)?>").expect("valid regex"),
        paragraph_close: Regex::new(r"(?i)</p>").expect("valid regex"),
        line_break: Regex::new(r"(?i)<br\s*/?>").expect("valid regex"),
        any_tag: Regex::new(r"<[^>]+>").expect("valid regex"),
    })
}

/// Decodes the handful of entities the content APIs emit
pub fn decode_entities(text: &str) -> String {
    text.replace("&#34;", "\"")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Normalizes a chapter body for the given target
///
/// * Plain-text target: every non-empty line is trimmed and indented with
///   [`PARAGRAPH_INDENT`]; blank lines between paragraphs are dropped.
/// * Markup target: paragraph and line-break tags are normalized; a plain
///   text body is wrapped into one escaped `<p>` per line.
///
/// # Examples
///
/// ```
/// use chapter_ripple::extract::{format_content, FormatTarget};
///
/// let text = format_content("<p>one</p>\n<p></p><p>two</p>", FormatTarget::PlainText, false);
/// assert_eq!(text, "  one\n  two");
/// ```
pub fn format_content(body: &str, target: FormatTarget, is_plain_text: bool) -> String {
    match (is_plain_text, target) {
        (true, FormatTarget::PlainText) => indent_lines(body),
        (true, FormatTarget::Markup) => body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("<p>{}</p>", escape_markup(line)))
            .collect::<Vec<_>>()
            .join("\n"),
        (false, FormatTarget::PlainText) => {
            let p = patterns();
            let cleaned = strip_wrappers(body);
            let text = p.paragraph_open.replace_all(&cleaned, "");
            let text = p.paragraph_close.replace_all(&text, "\n");
            let text = p.line_break.replace_all(&text, "\n");
            let text = p.any_tag.replace_all(&text, "");
            indent_lines(&decode_entities(&text))
        }
        (false, FormatTarget::Markup) => {
            let p = patterns();
            let cleaned = strip_wrappers(body);
            let text = p.paragraph_open.replace_all(&cleaned, "<p>");
            let text = p.line_break.replace_all(&text, "<br>");
            text.trim().to_string()
        }
    }
}

/// Removes header, article wrapper, trailing footer and empty paragraphs
fn strip_wrappers(body: &str) -> String {
    let p = patterns();
    let text = p.header.replace(body, "");
    let text = p.article.replace_all(&text, "");
    let text = p.footer.replace(&text, "");
    p.empty_paragraph.replace_all(&text, "").into_owned()
}

fn indent_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("{}{}", PARAGRAPH_INDENT, line))
        .collect::<Vec<_>>()
        .join("\n")
}
