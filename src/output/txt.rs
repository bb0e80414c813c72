//! TXT book export
//!
//! A book is written as its info header followed by every chapter in
//! reading order, each as `title`, blank line, `content`, blank line.

use crate::book::{BookInfo, DISCLAIMER};
use crate::download::{ChapterContent, ChapterResult};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Removes characters that are invalid in file names on common platforms
///
/// ```
/// use chapter_ripple::output::sanitize_filename;
///
/// assert_eq!(sanitize_filename(" a/b:c?\"d\" "), "abcd");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Formats a whole book
///
/// Failed chapters keep their slot and their failure message.
pub fn render_txt(info: &BookInfo, results: &[ChapterResult]) -> String {
    let mut txt = info.info_text();
    txt.push_str("\n\n");

    for result in results {
        txt.push_str(&result.title);
        txt.push_str("\n\n");
        txt.push_str(&result.content);
        txt.push_str("\n\n");
    }

    txt
}

/// Formats a single chapter saved on its own
pub fn render_chapter_txt(chapter: &ChapterContent) -> String {
    format!(
        "章节：{}\n\n{}\n\n---\n免责声明：{}",
        chapter.title, chapter.content, DISCLAIMER
    )
}

/// Writes `<book name>.txt` into `dir`, creating it if needed
///
/// # Returns
///
/// The path of the written file
pub fn write_txt(dir: &Path, info: &BookInfo, results: &[ChapterResult]) -> Result<PathBuf> {
    write_named(dir, &info.name, &info.book_id, &render_txt(info, results))
}

/// Writes `<chapter title>.txt` into `dir`, creating it if needed
pub fn write_chapter_txt(dir: &Path, chapter: &ChapterContent) -> Result<PathBuf> {
    write_named(dir, &chapter.title, "chapter", &render_chapter_txt(chapter))
}

fn write_named(dir: &Path, name: &str, fallback: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let stem = match sanitize_filename(name) {
        s if s.is_empty() => sanitize_filename(fallback),
        s => s,
    };
    let path = dir.join(format!("{}.txt", stem));
    fs::write(&path, contents)?;

    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote TXT file");
    Ok(path)
}
