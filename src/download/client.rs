//! HTTP client for the content and book APIs
//!
//! This module handles all outbound requests, including:
//! - Building the reqwest client with the configured user agent
//! - Per-request timeouts that drop the in-flight request
//! - Cancellation through a shared token
//! - Retry with exponential backoff and jitter
//! - Error classification into [`RippleError`] variants

use super::retry::{sleep_or_cancel, RetryPolicy};
use crate::{Result, RippleError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options applied to a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            headers: Vec::new(),
        }
    }

    /// Options for a JSON API request
    pub fn json(timeout: Duration) -> Self {
        Self::new(timeout).with_header("Accept", "application/json, text/plain, */*")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A completed response with its body fully read
///
/// Any status the server answered with lands here; the caller decides from
/// the body whether the response is usable.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport seam used by the fetchers
///
/// Implementations return an error only for transport failures; non-2xx
/// statuses come back as a [`RawResponse`]. Timeouts and cancellation are enforced by [`fetch`], so an
/// implementation may ignore `options.timeout`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<RawResponse>;
}

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Builds a client sending the given user agent
    ///
    /// # Example
    ///
    /// ```no_run
    /// use chapter_ripple::download::ReqwestClient;
    ///
    /// let client = ReqwestClient::new("Mozilla/5.0").unwrap();
    /// ```
    pub fn new(user_agent: &str) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, options: &RequestOptions) -> Result<RawResponse> {
        let mut request = self.client.get(url).timeout(options.timeout);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify(url, options.timeout, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(url, options.timeout, e))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn classify(url: &str, timeout: Duration, error: reqwest::Error) -> RippleError {
    if error.is_timeout() {
        RippleError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        RippleError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Performs one request bounded by the timeout and the cancellation token
///
/// When either fires first, the request future is dropped, which releases
/// the underlying connection. The status code is not checked.
pub async fn fetch(
    client: &dyn HttpClient,
    url: &str,
    options: &RequestOptions,
    cancel: &CancellationToken,
) -> Result<RawResponse> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RippleError::Cancelled { url: url.to_string() }),
        outcome = tokio::time::timeout(options.timeout, client.get(url, options)) => match outcome {
            Ok(result) => result,
            Err(_) => Err(RippleError::Timeout {
                url: url.to_string(),
                timeout_ms: options.timeout.as_millis() as u64,
            }),
        },
    }?;

    if !response.is_success() {
        tracing::debug!(url = %url, status = response.status, "Non-2xx response, body is used as is");
    }
    Ok(response)
}

/// Performs a request with up to `max_retries` additional attempts
///
/// The wait before attempt `k` (k >= 1) is `policy.delay_for(k)`. With the
/// default exponential policy that is `2^k * base` plus jitter. Cancellation
/// is never retried.
///
/// # Arguments
///
/// * `client` - Transport to send the request with
/// * `url` - Absolute URL to fetch
/// * `options` - Timeout and headers for each attempt
/// * `max_retries` - Additional attempts after the first
/// * `policy` - Delay schedule between attempts
/// * `cancel` - Token aborting the request and any pending wait
pub async fn fetch_with_retry(
    client: &dyn HttpClient,
    url: &str,
    options: &RequestOptions,
    max_retries: u32,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<RawResponse> {
    let mut attempt = 0;

    loop {
        match fetch(client, url, options, cancel).await {
            Ok(response) => {
                if attempt > 0 {
                    tracing::debug!(url = %url, attempt, "Request succeeded after retry");
                }
                return Ok(response);
            }
            Err(RippleError::Cancelled { url }) => return Err(RippleError::Cancelled { url }),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    url = %url,
                    attempt,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                if !sleep_or_cancel(delay, cancel).await {
                    return Err(RippleError::Cancelled {
                        url: url.to_string(),
                    });
                }
            }
            Err(e) => return Err(e),
        }
    }
}
