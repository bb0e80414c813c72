//! Chapter data carried through the download pipeline

/// One chapter of a book, in reading order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDescriptor {
    /// Opaque chapter id, unique within the book
    pub id: String,
    /// Display title, possibly a placeholder
    pub title: String,
}

impl ChapterDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Title and formatted body of a fetched chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    pub title: String,
    pub content: String,
}

/// Outcome of downloading one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterResult {
    pub title: String,
    /// Formatted body, or a bracketed failure message
    pub content: String,
    pub success: bool,
    /// Attempts beyond the first: the attempt that succeeded, or the
    /// exhausted maximum for a failure
    pub retries: u32,
}

impl ChapterResult {
    pub fn succeeded(content: ChapterContent, retries: u32) -> Self {
        Self {
            title: content.title,
            content: content.content,
            success: true,
            retries,
        }
    }

    pub fn failed(title: impl Into<String>, message: impl AsRef<str>, retries: u32) -> Self {
        Self {
            title: title.into(),
            content: format!("[download failed: {}]", message.as_ref()),
            success: false,
            retries,
        }
    }
}
