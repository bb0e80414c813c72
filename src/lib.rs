//! Chapter-Ripple: a polite web novel chapter downloader
//!
//! This crate fetches chapter content from a user-configured third-party API,
//! normalizes the varying response shapes into a title and body, downloads whole
//! books in bounded concurrent windows and retries failures in two tiers.

pub mod book;
pub mod config;
pub mod download;
pub mod extract;
pub mod output;
pub mod resolve;

use thiserror::Error;

/// Main error type for Chapter-Ripple operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout ({timeout_ms}ms) for {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Request cancelled for {url}")]
    Cancelled { url: String },

    #[error("Empty response from {url}")]
    EmptyResponse { url: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response is missing the `{field}` field")]
    MissingField { field: &'static str },

    #[error("Invalid `{field}` field: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("No chapter id found in page URL {page_url}")]
    MissingChapterId { page_url: String },

    #[error("No book id found in {input}")]
    MissingBookId { input: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Book API error: {0}")]
    BookApi(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RippleError {
    /// Returns true if the error comes from the user's configuration or page
    /// context rather than from the remote API. These are never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::MissingChapterId { .. } | Self::MissingBookId { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No API configuration at index {0}")]
    UnknownApi(usize),

    #[error("Cannot delete the last API configuration")]
    LastApi,
}

/// Result type alias for Chapter-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{ApiConfig, ApiRegistry, Config};
pub use download::{
    AutoRetryCoordinator, BatchDownloader, ChapterDescriptor, ChapterFetcher, ChapterResult,
    DownloadStats, RetryPolicy,
};
pub use extract::{Normalizer, ResponseShape};
pub use resolve::resolve_chapter_id;
