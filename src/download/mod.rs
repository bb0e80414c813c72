//! Chapter download pipeline
//!
//! This module contains the download machinery, including:
//! - The HTTP transport seam and its reqwest implementation
//! - Retry policies for requests, chapters and batch passes
//! - Single-chapter fetching and normalization
//! - Windowed batch downloads with auto-retry of failures
//! - Download statistics

mod auto_retry;
mod batch;
mod chapter;
mod client;
mod models;
mod retry;
mod stats;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use auto_retry::AutoRetryCoordinator;
pub use batch::{BatchDownloader, ProgressSink};
pub use chapter::ChapterFetcher;
pub use client::{fetch, fetch_with_retry, HttpClient, RawResponse, ReqwestClient, RequestOptions};
pub use models::{ChapterContent, ChapterDescriptor, ChapterResult};
pub use retry::{worst_case_attempts, Backoff, RetryPolicy};
pub use stats::{print_statistics, DownloadStats};
