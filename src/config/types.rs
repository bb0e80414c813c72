use crate::extract::ResponseShape;
use serde::Deserialize;

/// Token replaced by the chapter id in an API url template
pub const CHAPTER_ID_PLACEHOLDER: &str = "{chapter_id}";

/// Placeholder substituted with the book id in book API urls
pub const BOOK_ID_PLACEHOLDER: &str = "{book_id}";

/// Main configuration structure for Chapter-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Index into `api` of the configuration used for downloads
    #[serde(rename = "current-api", default)]
    pub current_api: usize,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(rename = "book-api", default)]
    pub book_api: BookApiConfig,

    #[serde(default)]
    pub api: Vec<ApiConfig>,
}

/// Retry, pacing and request behavior shared by every download
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Additional attempts per chapter after the first one fails
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay of the per-chapter exponential backoff (milliseconds)
    #[serde(rename = "retry-base-delay", default = "default_retry_base_delay")]
    pub retry_base_delay: u64,

    /// Upper bound of the random jitter added to every backoff (milliseconds)
    #[serde(rename = "retry-jitter", default = "default_retry_jitter")]
    pub retry_jitter: u64,

    /// Whether failed chapters get coordinated re-download passes
    #[serde(rename = "auto-retry", default = "default_auto_retry")]
    pub auto_retry: bool,

    /// Number of auto-retry passes over the failed chapters
    #[serde(rename = "batch-retry-passes", default = "default_max_retries")]
    pub batch_retry_passes: u32,

    /// Delay before auto-retry pass p is `batch_retry_delay * p` (milliseconds)
    #[serde(rename = "batch-retry-delay", default = "default_batch_retry_delay")]
    pub batch_retry_delay: u64,

    /// Lower bound of the pause between download windows (milliseconds)
    #[serde(rename = "window-pause-min", default = "default_window_pause_min")]
    pub window_pause_min: u64,

    /// Upper bound of the pause between download windows (milliseconds)
    #[serde(rename = "window-pause-max", default = "default_window_pause_max")]
    pub window_pause_max: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_base_delay: default_retry_base_delay(),
            retry_jitter: default_retry_jitter(),
            auto_retry: default_auto_retry(),
            batch_retry_passes: default_max_retries(),
            batch_retry_delay: default_batch_retry_delay(),
            window_pause_min: default_window_pause_min(),
            window_pause_max: default_window_pause_max(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the TXT books are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// Endpoints of the book metadata and chapter list services
#[derive(Debug, Clone, Deserialize)]
pub struct BookApiConfig {
    /// Book metadata endpoint, `{book_id}` is substituted
    #[serde(rename = "info-url", default = "default_info_url")]
    pub info_url: String,

    /// Chapter directory endpoint, `{book_id}` is substituted
    #[serde(rename = "directory-url", default = "default_directory_url")]
    pub directory_url: String,

    /// Request timeout (milliseconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl BookApiConfig {
    pub fn info_url_for(&self, book_id: &str) -> String {
        self.info_url.replace(BOOK_ID_PLACEHOLDER, book_id)
    }

    pub fn directory_url_for(&self, book_id: &str) -> String {
        self.directory_url.replace(BOOK_ID_PLACEHOLDER, book_id)
    }
}

impl Default for BookApiConfig {
    fn default() -> Self {
        Self {
            info_url: default_info_url(),
            directory_url: default_directory_url(),
            timeout: default_timeout(),
        }
    }
}

/// One third-party chapter content API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Display name
    pub name: String,

    /// Request url; `{chapter_id}` is substituted, or `item_id` is appended
    /// as a query parameter when the token is absent
    #[serde(rename = "url-template")]
    pub url_template: String,

    /// Where the chapter content lives in the JSON envelope
    #[serde(rename = "response-shape", default)]
    pub response_shape: ResponseShape,

    /// Whether the content is plain text rather than markup
    #[serde(rename = "plain-text", default)]
    pub is_plain_text: bool,

    /// Whether the content starts with its own chapter title
    #[serde(rename = "embedded-title", default = "default_embedded_title")]
    pub has_embedded_title: bool,

    /// Request timeout (milliseconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Number of chapters fetched concurrently per window
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl ApiConfig {
    /// Creates an API configuration with default format settings
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            response_shape: ResponseShape::default(),
            is_plain_text: false,
            has_embedded_title: default_embedded_title(),
            timeout: default_timeout(),
            concurrency: default_concurrency(),
        }
    }

    /// Builds the request url for a chapter
    ///
    /// ```
    /// use chapter_ripple::config::ApiConfig;
    ///
    /// let api = ApiConfig::new("a", "https://api.example.com/c/{chapter_id}");
    /// assert_eq!(api.chapter_url("42"), "https://api.example.com/c/42");
    ///
    /// let api = ApiConfig::new("b", "https://api.example.com/content");
    /// assert_eq!(api.chapter_url("42"), "https://api.example.com/content?item_id=42");
    /// ```
    pub fn chapter_url(&self, chapter_id: &str) -> String {
        let template = self.url_template.trim();
        if template.contains(CHAPTER_ID_PLACEHOLDER) {
            return template.replace(CHAPTER_ID_PLACEHOLDER, chapter_id);
        }

        let separator = if template.ends_with('?') || template.ends_with('&') {
            ""
        } else if template.contains('?') {
            "&"
        } else {
            "?"
        };
        format!("{}{}item_id={}", template, separator, chapter_id)
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay() -> u64 {
    1000
}

fn default_retry_jitter() -> u64 {
    500
}

fn default_auto_retry() -> bool {
    true
}

fn default_batch_retry_delay() -> u64 {
    3000
}

fn default_window_pause_min() -> u64 {
    200
}

fn default_window_pause_max() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string()
}

fn default_output_directory() -> String {
    "./downloads".to_string()
}

fn default_info_url() -> String {
    "https://i.snssdk.com/reading/bookapi/multi-detail/v/?aid=1967&book_id={book_id}".to_string()
}

fn default_directory_url() -> String {
    "https://fanqienovel.com/api/reader/directory/detail?bookId={book_id}".to_string()
}

fn default_embedded_title() -> bool {
    true
}

fn default_timeout() -> u64 {
    20000
}

fn default_concurrency() -> usize {
    2
}
