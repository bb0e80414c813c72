//! Scripted [`HttpClient`] for unit tests

use super::client::{HttpClient, RawResponse, RequestOptions};
use crate::config::ApiConfig;
use crate::{Result, RippleError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

pub(crate) const TEST_TEMPLATE: &str = "http://api.test/content?item_id={chapter_id}";

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(String),
    Status(u16, String),
    Delayed(Duration, String),
    Fail,
    Empty,
}

/// Replies are scripted per route key, the last reply of a script repeats
pub(crate) struct FakeClient {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Option<Reply>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeClient {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            fallback: None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn route(self, key: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(key.to_string(), replies.into());
        self
    }

    pub(crate) fn fallback(mut self, reply: Reply) -> Self {
        self.fallback = Some(reply);
        self
    }

    pub(crate) fn calls(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn next_reply(&self, key: &str) -> Reply {
        *self.calls.lock().unwrap().entry(key.to_string()).or_default() += 1;

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(key) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script.front().cloned().unwrap_or(Reply::Fail),
            None => self.fallback.clone().unwrap_or(Reply::Fail),
        }
    }
}

/// Routes by the chapter or book id query parameter, else by the full url
fn route_key(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == "item_id" || k == "book_id" || k == "bookId")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_else(|| url.to_string())
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn get(&self, url: &str, _options: &RequestOptions) -> Result<RawResponse> {
        let reply = self.next_reply(&route_key(url));
        let (status, body) = match reply {
            Reply::Json(body) => (200, body),
            Reply::Status(status, body) => (status, body),
            Reply::Delayed(delay, body) => {
                tokio::time::sleep(delay).await;
                (200, body)
            }
            Reply::Fail => {
                return Err(RippleError::Timeout {
                    url: url.to_string(),
                    timeout_ms: 0,
                })
            }
            Reply::Empty => (200, String::new()),
        };

        Ok(RawResponse {
            status,
            body: body.into_bytes(),
        })
    }
}

/// Root-shaped plain-text chapter body with an embedded title
pub(crate) fn chapter_json(title: &str, body: &str) -> String {
    serde_json::json!({ "content": format!("{}\n{}", title, body) }).to_string()
}

pub(crate) fn test_api() -> ApiConfig {
    let mut api = ApiConfig::new("test", TEST_TEMPLATE);
    api.is_plain_text = true;
    api
}
