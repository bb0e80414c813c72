//! Windowed batch downloads
//!
//! Chapters are downloaded in consecutive windows of `concurrency` items.
//! Every window runs fully concurrently, then the downloader pauses for a
//! random interval before starting the next one. Results keep the order of
//! the input list no matter in which order requests complete.

use super::auto_retry::AutoRetryCoordinator;
use super::chapter::ChapterFetcher;
use super::models::{ChapterDescriptor, ChapterResult};
use super::retry::sleep_or_cancel;
use super::stats::DownloadStats;
use crate::config::DownloadConfig;
use futures::future::join_all;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Receives progress after every window and retry pass
pub trait ProgressSink: Send + Sync {
    fn report(&self, stats: &DownloadStats);
}

impl<F> ProgressSink for F
where
    F: Fn(&DownloadStats) + Send + Sync,
{
    fn report(&self, stats: &DownloadStats) {
        self(stats)
    }
}

/// Downloads whole chapter lists in bounded concurrent windows
pub struct BatchDownloader {
    fetcher: ChapterFetcher,
    concurrency: usize,
    pause_min: Duration,
    pause_max: Duration,
    auto_retry: Option<AutoRetryCoordinator>,
    progress: Option<Arc<dyn ProgressSink>>,
    stats: DownloadStats,
}

impl BatchDownloader {
    /// Creates a downloader using the api's concurrency and no auto-retry
    pub fn new(fetcher: ChapterFetcher) -> Self {
        let concurrency = fetcher.api().concurrency;
        let defaults = DownloadConfig::default();
        Self {
            fetcher,
            concurrency,
            pause_min: Duration::from_millis(defaults.window_pause_min),
            pause_max: Duration::from_millis(defaults.window_pause_max),
            auto_retry: None,
            progress: None,
            stats: DownloadStats::default(),
        }
    }

    /// Creates a downloader with pauses and auto-retry taken from `config`
    pub fn from_config(fetcher: ChapterFetcher, config: &DownloadConfig) -> Self {
        Self::new(fetcher)
            .with_window_pause(
                Duration::from_millis(config.window_pause_min),
                Duration::from_millis(config.window_pause_max),
            )
            .with_auto_retry(AutoRetryCoordinator::from_config(config))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_window_pause(mut self, min: Duration, max: Duration) -> Self {
        self.pause_min = min;
        self.pause_max = max.max(min);
        self
    }

    pub fn with_auto_retry(mut self, auto_retry: Option<AutoRetryCoordinator>) -> Self {
        self.auto_retry = auto_retry;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Statistics of the latest batch
    pub fn stats(&self) -> &DownloadStats {
        &self.stats
    }

    /// Downloads every chapter and returns one result per input, in order
    ///
    /// Statistics are reset at the start of each call. When auto-retry is
    /// enabled, chapters still failing after the last window are re-driven
    /// before returning. Cancelling the fetcher's token stops after the
    /// current window; chapters never started are reported as failed.
    pub async fn download_batch(&mut self, chapters: &[ChapterDescriptor]) -> Vec<ChapterResult> {
        self.stats = DownloadStats::new(chapters.len());
        let mut results: Vec<ChapterResult> = Vec::with_capacity(chapters.len());

        // chunks() panics on zero
        let window_size = self.concurrency.max(1);
        let window_count = chapters.len().div_ceil(window_size);
        tracing::info!(
            chapters = chapters.len(),
            window_size,
            windows = window_count,
            "Starting batch download"
        );

        for (window_index, window) in chapters.chunks(window_size).enumerate() {
            if self.fetcher.cancellation().is_cancelled() {
                break;
            }

            let offset = window_index * window_size;
            let downloads = window.iter().enumerate().map(|(i, chapter)| {
                self.fetcher
                    .download_chapter(&chapter.id, offset + i, Some(&chapter.title))
            });
            let window_results = join_all(downloads).await;

            for result in &window_results {
                self.stats.record(result);
            }
            results.extend(window_results);
            self.report_progress();

            tracing::debug!(
                window = window_index + 1,
                windows = window_count,
                success = self.stats.success,
                failed = self.stats.failed,
                "Window finished"
            );

            if window_index + 1 < window_count {
                let pause = self.random_pause();
                if !sleep_or_cancel(pause, self.fetcher.cancellation()).await {
                    break;
                }
            }
        }

        // Chapters skipped by cancellation keep their slot
        for (index, chapter) in chapters.iter().enumerate().skip(results.len()) {
            let title = if chapter.title.trim().is_empty() {
                format!("第{}章", index + 1)
            } else {
                chapter.title.clone()
            };
            let skipped = ChapterResult::failed(title, "cancelled", 0);
            self.stats.record(&skipped);
            results.push(skipped);
        }

        let failed: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, result)| !result.success)
            .map(|(index, _)| index)
            .collect();

        if let Some(coordinator) = &self.auto_retry {
            if !failed.is_empty() && !self.fetcher.cancellation().is_cancelled() {
                coordinator
                    .retry_failed(&self.fetcher, chapters, failed, &mut results, &mut self.stats)
                    .await;
                self.report_progress();
            }
        }

        tracing::info!(
            success = self.stats.success,
            failed = self.stats.failed,
            retried = self.stats.retried,
            "Batch download finished"
        );

        results
    }

    fn random_pause(&self) -> Duration {
        let min = self.pause_min.as_millis() as u64;
        let max = self.pause_max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    fn report_progress(&self) {
        if let Some(progress) = &self.progress {
            progress.report(&self.stats);
        }
    }
}
