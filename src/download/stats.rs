//! Download statistics
//!
//! Counters for one batch run plus the end-of-run summary printed by the
//! CLI.

use super::models::ChapterResult;

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Chapters requested
    pub total: usize,

    /// Chapters with a successful result
    pub success: usize,

    /// Chapters whose latest result failed
    pub failed: usize,

    /// Attempts made beyond each chapter's first one, across both retry tiers
    pub retried: usize,

    /// Successful chapters that needed at least one retry
    pub retried_success: usize,
}

impl DownloadStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Records the first result of a chapter
    pub fn record(&mut self, result: &ChapterResult) {
        self.retried += result.retries as usize;
        if result.success {
            self.success += 1;
            if result.retries > 0 {
                self.retried_success += 1;
            }
        } else {
            self.failed += 1;
        }
    }

    /// Records the result of re-driving a previously failed chapter
    pub fn record_retry(&mut self, result: &ChapterResult) {
        self.retried += 1 + result.retries as usize;
        if result.success {
            self.success += 1;
            self.failed = self.failed.saturating_sub(1);
            self.retried_success += 1;
        }
    }

    /// Chapters with a result so far
    pub fn completed(&self) -> usize {
        self.success + self.failed
    }

    /// Fraction of chapters with a result, in `[0, 1]`
    pub fn fraction_complete(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed() as f64 / self.total as f64
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DownloadStats) {
    println!("=== Download Statistics ===\n");

    println!("Overview:");
    println!("  Chapters requested: {}", stats.total);
    println!("  Downloaded: {}", stats.success);
    println!("  Failed: {}", stats.failed);
    println!();

    if stats.retried > 0 {
        println!("Retries:");
        println!("  Extra attempts: {}", stats.retried);
        println!("  Recovered chapters: {}", stats.retried_success);
        println!();
    }

    let success_rate = if stats.total > 0 {
        (stats.success as f64 / stats.total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} chapters downloaded)",
        success_rate, stats.success, stats.total
    );
}
