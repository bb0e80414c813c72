//! Single-chapter fetching
//!
//! A [`ChapterFetcher`] downloads one chapter from the active content API,
//! normalizes it and retries failures with exponential backoff.

use super::client::{fetch_with_retry, HttpClient, RequestOptions};
use super::models::{ChapterContent, ChapterResult};
use super::retry::{sleep_or_cancel, RetryPolicy};
use crate::config::ApiConfig;
use crate::extract::{extract_content, format_content, FormatTarget, Normalizer, TitleContext};
use crate::resolve::resolve_chapter_id;
use crate::{Result, RippleError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fetches and normalizes chapters from one content API
#[derive(Clone)]
pub struct ChapterFetcher {
    client: Arc<dyn HttpClient>,
    api: ApiConfig,
    retry: RetryPolicy,
    normalizer: Arc<Normalizer>,
    cancel: CancellationToken,
}

impl ChapterFetcher {
    pub fn new(client: Arc<dyn HttpClient>, api: ApiConfig, retry: RetryPolicy) -> Self {
        Self {
            client,
            api,
            retry,
            normalizer: Arc::new(Normalizer::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Arc<Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Downloads one chapter formatted for TXT export
    ///
    /// Never returns an error: after the retries are exhausted the result
    /// carries `success: false` and a bracketed failure message as content.
    ///
    /// # Arguments
    ///
    /// * `chapter_id` - Chapter id substituted into the url template
    /// * `ordinal` - Zero-based position in the book, used for the fallback title
    /// * `fallback_title` - Title from the chapter list, if known
    pub async fn download_chapter(
        &self,
        chapter_id: &str,
        ordinal: usize,
        fallback_title: Option<&str>,
    ) -> ChapterResult {
        let fallback = fallback_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("第{}章", ordinal + 1));

        if self.api.url_template.trim().is_empty() {
            tracing::error!(api = %self.api.name, "Content API url is not configured");
            return ChapterResult::failed(fallback, "content API url is not configured", 0);
        }

        let context = TitleContext {
            chapter_id: Some(chapter_id),
            fallback_title: Some(&fallback),
            page_url: None,
        };

        let (outcome, retries) = self
            .with_retries(chapter_id, || {
                self.fetch_once(chapter_id, &context, FormatTarget::PlainText)
            })
            .await;

        match outcome {
            Ok(content) => ChapterResult::succeeded(content, retries),
            Err(e) => {
                tracing::error!(
                    chapter_id = %chapter_id,
                    retries,
                    error = %e,
                    "Chapter download failed"
                );
                ChapterResult::failed(fallback, e.to_string(), retries)
            }
        }
    }

    /// Fetches the chapter a reader page is showing
    ///
    /// The chapter id is taken from `page_url`; when none can be found the
    /// call fails with [`RippleError::MissingChapterId`] before any request.
    pub async fn fetch_for_page(&self, page_url: &Url, target: FormatTarget) -> Result<ChapterContent> {
        let chapter_id =
            resolve_chapter_id(page_url).ok_or_else(|| RippleError::MissingChapterId {
                page_url: page_url.to_string(),
            })?;

        let context = TitleContext {
            chapter_id: Some(&chapter_id),
            fallback_title: None,
            page_url: Some(page_url),
        };

        let (outcome, _) = self
            .with_retries(&chapter_id, || self.fetch_once(&chapter_id, &context, target))
            .await;
        outcome
    }

    /// One request plus normalization, no retries
    async fn fetch_once(
        &self,
        chapter_id: &str,
        context: &TitleContext<'_>,
        target: FormatTarget,
    ) -> Result<ChapterContent> {
        let url = self.api.chapter_url(chapter_id);
        let options = RequestOptions::json(Duration::from_millis(self.api.timeout));

        // Retries happen one level up
        let response = fetch_with_retry(
            self.client.as_ref(),
            &url,
            &options,
            0,
            &self.retry,
            &self.cancel,
        )
        .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(RippleError::EmptyResponse { url });
        }

        let value: serde_json::Value = serde_json::from_str(&text)?;
        let raw = extract_content(&value, self.api.response_shape)?;
        let extracted = self.normalizer.extract(
            &raw,
            self.api.is_plain_text,
            self.api.has_embedded_title,
            context,
        );

        Ok(ChapterContent {
            title: extracted.title,
            content: format_content(&extracted.content, target, self.api.is_plain_text),
        })
    }

    /// Runs `op` until it succeeds or the retries are exhausted
    ///
    /// Returns the final outcome and the number of retries spent. After the
    /// failed attempt `n` (zero-based) the wait is `2^n * base` plus jitter.
    async fn with_retries<T, F, Fut>(&self, chapter_id: &str, mut op: F) -> (Result<T>, u32)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return (Ok(value), attempt),
                Err(e) if e.is_configuration() || matches!(e, RippleError::Cancelled { .. }) => {
                    return (Err(e), attempt);
                }
                Err(e) if attempt < max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        chapter_id = %chapter_id,
                        attempt = attempt + 1,
                        max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Chapter attempt failed, retrying"
                    );
                    if !sleep_or_cancel(delay, &self.cancel).await {
                        return (Err(e), attempt);
                    }
                    attempt += 1;
                }
                Err(e) => return (Err(e), max_retries),
            }
        }
    }
}
