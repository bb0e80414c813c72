//! Book metadata and chapter directory
//!
//! Whole-book downloads need two lookups before any chapter is fetched:
//! the book's metadata (for the TXT header) and its ordered chapter list.

mod parse;

pub use parse::{parse_book_info, parse_chapter_list};

use crate::config::BookApiConfig;
use crate::download::{fetch_with_retry, ChapterDescriptor, HttpClient, RequestOptions, RetryPolicy};
use crate::resolve::resolve_page;
use crate::{Result, RippleError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Notice appended to every exported book
pub const DISCLAIMER: &str = "本工具仅为个人学习、研究或欣赏目的提供便利，下载的小说版权归原作者及版权方所有。若因使用本工具导致任何版权纠纷或法律问题，使用者需自行承担全部责任。";

/// Reads a book id from a bare id or from a book or reader page URL
pub fn parse_book_input(input: &str) -> Result<String> {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Ok(input.to_string());
    }

    Url::parse(input)
        .ok()
        .as_ref()
        .and_then(resolve_page)
        .map(|page| page.book_id)
        .ok_or_else(|| RippleError::MissingBookId {
            input: input.to_string(),
        })
}

/// Book metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInfo {
    pub book_id: String,
    pub name: String,
    pub author: String,
    pub abstract_text: String,
    /// Total characters
    pub word_count: Option<u64>,
    pub chapter_count: Option<u64>,
    pub cover_url: Option<String>,
}

impl BookInfo {
    /// Header block placed at the top of an exported TXT book
    pub fn info_text(&self) -> String {
        let words = self
            .word_count
            .map(|w| format!("{}万字", w as f64 / 10000.0))
            .unwrap_or_else(|| "未知".to_string());
        let chapters = self
            .chapter_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "未知".to_string());

        format!(
            "书名：{}\n作者：{}\n字数：{}\n章节数：{}\n简介：{}\n免责声明：{}",
            self.name, self.author, words, chapters, self.abstract_text, DISCLAIMER
        )
    }
}

/// Client for the book metadata and directory endpoints
pub struct BookApi {
    client: Arc<dyn HttpClient>,
    config: BookApiConfig,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl BookApi {
    /// `retry.max_retries` applies to every request
    pub fn new(client: Arc<dyn HttpClient>, config: BookApiConfig, retry: RetryPolicy) -> Self {
        Self {
            client,
            config,
            retry,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetches name, author, abstract and counts of a book
    pub async fn fetch_book_info(&self, book_id: &str) -> Result<BookInfo> {
        let value = self.get_json(&self.config.info_url_for(book_id)).await?;
        let info = parse_book_info(book_id, &value)?;
        tracing::info!(book_id = %book_id, name = %info.name, "Fetched book info");
        Ok(info)
    }

    /// Fetches the ordered chapter list of a book
    pub async fn fetch_chapters(&self, book_id: &str) -> Result<Vec<ChapterDescriptor>> {
        let value = self.get_json(&self.config.directory_url_for(book_id)).await?;
        let chapters = parse_chapter_list(&value)?;
        tracing::info!(book_id = %book_id, chapters = chapters.len(), "Fetched chapter list");
        Ok(chapters)
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let options = RequestOptions::json(Duration::from_millis(self.config.timeout));
        let response = fetch_with_retry(
            self.client.as_ref(),
            url,
            &options,
            self.retry.max_retries,
            &self.retry,
            &self.cancel,
        )
        .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(RippleError::EmptyResponse {
                url: url.to_string(),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}
