//! Batch-level auto-retry
//!
//! After a batch finishes, chapters that still failed are re-driven for a
//! bounded number of passes. Pass `p` waits `p * batch-retry-delay` first,
//! giving a flaky API time to recover.

use super::chapter::ChapterFetcher;
use super::models::{ChapterDescriptor, ChapterResult};
use super::retry::{sleep_or_cancel, RetryPolicy};
use super::stats::DownloadStats;
use crate::config::DownloadConfig;
use futures::future::join_all;

/// Re-drives failed chapters with linearly growing pauses between passes
#[derive(Debug, Clone)]
pub struct AutoRetryCoordinator {
    policy: RetryPolicy,
}

impl AutoRetryCoordinator {
    /// `policy.max_retries` is the number of passes
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Returns `None` when auto-retry is disabled
    pub fn from_config(config: &DownloadConfig) -> Option<Self> {
        config
            .auto_retry
            .then(|| Self::new(RetryPolicy::batch(config)))
    }

    pub fn max_passes(&self) -> u32 {
        self.policy.max_retries
    }

    /// Retries the chapters at the `failed` positions of `results`
    ///
    /// Results are replaced in place, so positions never shift. Stops when
    /// nothing is left failing, the passes run out or the fetcher is
    /// cancelled.
    ///
    /// # Returns
    ///
    /// The number of passes actually run
    pub async fn retry_failed(
        &self,
        fetcher: &ChapterFetcher,
        chapters: &[ChapterDescriptor],
        mut failed: Vec<usize>,
        results: &mut [ChapterResult],
        stats: &mut DownloadStats,
    ) -> u32 {
        let mut passes = 0;

        while passes < self.max_passes() && !failed.is_empty() {
            let pass = passes + 1;
            let delay = self.policy.delay_for(pass);
            tracing::info!(
                pass,
                failed = failed.len(),
                delay_ms = delay.as_millis() as u64,
                "Auto-retrying failed chapters"
            );
            if !sleep_or_cancel(delay, fetcher.cancellation()).await {
                tracing::warn!("Auto-retry cancelled");
                break;
            }

            let attempts = failed.iter().map(|&index| {
                let chapter = &chapters[index];
                fetcher.download_chapter(&chapter.id, index, Some(&chapter.title))
            });
            let outcomes = join_all(attempts).await;

            for (&index, outcome) in failed.iter().zip(outcomes) {
                stats.record_retry(&outcome);
                results[index] = outcome;
            }
            failed.retain(|&index| !results[index].success);
            passes = pass;

            tracing::info!(pass, remaining = failed.len(), "Auto-retry pass finished");
        }

        passes
    }
}
