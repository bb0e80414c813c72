//! Chapter fetching through the real reqwest client
//!
//! These tests use wiremock to stand in for the content API and exercise
//! request building, envelope extraction and the retry tiers end to end.

use chapter_ripple::config::{parse_config, ApiConfig};
use chapter_ripple::download::{ChapterFetcher, HttpClient, ReqwestClient, RetryPolicy};
use chapter_ripple::extract::FormatTarget;
use chapter_ripple::{ApiRegistry, ResponseShape};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> Arc<dyn HttpClient> {
    Arc::new(ReqwestClient::new("TestAgent/1.0").expect("client builds"))
}

fn content_api(server: &MockServer) -> ApiConfig {
    let mut api = ApiConfig::new("mock", format!("{}/content?item_id={{chapter_id}}", server.uri()));
    api.is_plain_text = true;
    api.timeout = 2000;
    api
}

/// Short delays and no jitter keep the tests fast
fn quick_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy::exponential(max_retries, Duration::from_millis(10))
}

#[tokio::test]
async fn test_root_shape_plain_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content"))
        .and(query_param("item_id", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "content": "第12章 风起\n正文第一行\n\n正文第二行"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ChapterFetcher::new(client(), content_api(&server), quick_retries(2));
    let result = fetcher.download_chapter("12", 11, None).await;

    assert!(result.success);
    assert_eq!(result.retries, 0);
    assert_eq!(result.title, "第12章 风起");
    assert_eq!(result.content, "  正文第一行\n  正文第二行");
}

#[tokio::test]
async fn test_data_shape_markup_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content"))
        .and(query_param("item_id", "7001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "content": "<article><h1>第3章 雨</h1><p>一</p><p></p><p>二<br/>三</p></article>"
            }
        })))
        .mount(&server)
        .await;

    let mut api = content_api(&server);
    api.is_plain_text = false;
    api.response_shape = ResponseShape::Data;
    let fetcher = ChapterFetcher::new(client(), api, quick_retries(0));

    let page = url::Url::parse("https://fanqienovel.com/reader/7001?enter_from=page").unwrap();
    let chapter = fetcher.fetch_for_page(&page, FormatTarget::Markup).await.unwrap();
    assert_eq!(chapter.title, "第3章 雨");
    assert_eq!(chapter.content, "<p>一</p><p>二<br>三</p>");

    let chapter = fetcher.fetch_for_page(&page, FormatTarget::PlainText).await.unwrap();
    assert_eq!(chapter.content, "  一\n  二\n  三");
}

#[tokio::test]
async fn test_error_page_fails_through_parse() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Internal Server Error</html>"))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = ChapterFetcher::new(client(), content_api(&server), quick_retries(2));
    let result = fetcher.download_chapter("1", 0, Some("序章")).await;

    assert!(!result.success);
    assert_eq!(result.retries, 2);
    assert_eq!(result.title, "序章");
    assert!(result.content.contains("Invalid JSON"), "{}", result.content);
}

#[tokio::test]
async fn test_error_status_with_content_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content"))
        .and(query_param("item_id", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 500,
            "content": "第1章 始\n正文"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ChapterFetcher::new(client(), content_api(&server), quick_retries(0));
    let result = fetcher.download_chapter("1", 0, None).await;

    assert!(result.success, "{}", result.content);
    assert_eq!(result.retries, 0);
    assert_eq!(result.title, "第1章 始");
    assert_eq!(result.content, "  正文");
}

#[tokio::test]
async fn test_timeout_fails_chapter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "content": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut api = content_api(&server);
    api.timeout = 200;
    let fetcher = ChapterFetcher::new(client(), api, quick_retries(0));

    let result = fetcher.download_chapter("1", 0, None).await;
    assert!(!result.success);
    assert!(result.content.contains("timeout"), "{}", result.content);
}

#[tokio::test]
async fn test_empty_body_fails_chapter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  "))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = ChapterFetcher::new(client(), content_api(&server), quick_retries(1));
    let result = fetcher.download_chapter("1", 0, None).await;

    assert!(!result.success);
    assert!(result.content.contains("Empty response"), "{}", result.content);
}

#[tokio::test]
async fn test_configured_api_fetches_chapter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/chapter/99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "content": "<p>无标题正文</p>" }
        })))
        .mount(&server)
        .await;

    let toml = format!(
        r#"
current-api = 1

[[api]]
name = "unused"
url-template = "https://unused.example.com/content"

[[api]]
name = "mock"
url-template = "{}/v2/chapter/{{chapter_id}}"
response-shape = "data"
"#,
        server.uri()
    );
    let config = parse_config(&toml).unwrap();
    let registry = ApiRegistry::from_config(&config).unwrap();
    assert_eq!(registry.current().name, "mock");

    let fetcher = ChapterFetcher::new(client(), registry.current().clone(), quick_retries(0));
    let result = fetcher.download_chapter("99", 4, None).await;

    assert!(result.success);
    assert_eq!(result.title, "第5章");
    assert_eq!(result.content, "  无标题正文");
}
