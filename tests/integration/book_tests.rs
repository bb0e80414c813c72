//! Whole-book downloads against mock book and content APIs

use chapter_ripple::book::BookApi;
use chapter_ripple::config::{ApiConfig, BookApiConfig, DownloadConfig};
use chapter_ripple::download::{
    AutoRetryCoordinator, BatchDownloader, ChapterFetcher, HttpClient, ReqwestClient, RetryPolicy,
};
use chapter_ripple::output::write_txt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOOK_ID: &str = "7143038691944959011";

fn client() -> Arc<dyn HttpClient> {
    Arc::new(ReqwestClient::new("TestAgent/1.0").expect("client builds"))
}

fn book_api_config(server: &MockServer) -> BookApiConfig {
    BookApiConfig {
        info_url: format!("{}/info?book_id={{book_id}}", server.uri()),
        directory_url: format!("{}/directory?bookId={{book_id}}", server.uri()),
        timeout: 2000,
    }
}

async fn mount_book(server: &MockServer, chapter_ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/info"))
        .and(query_param("book_id", BOOK_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "book_name": "星海/纪元",
                "author": "某人",
                "abstract": "一段简介",
                "word_number": "250000",
                "serial_count": chapter_ids.len().to_string()
            }]
        })))
        .mount(server)
        .await;

    let items: Vec<_> = chapter_ids
        .iter()
        .enumerate()
        .map(|(i, id)| json!({ "itemId": id, "title": format!("第{}章 名", i + 1) }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/directory"))
        .and(query_param("bookId", BOOK_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "chapterListWithVolume": [items] }
        })))
        .mount(server)
        .await;
}

async fn mount_chapter(server: &MockServer, id: &str, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({ "content": format!("第{}号\n内容{}", id, id) }))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path("/content"))
        .and(query_param("item_id", id))
        .respond_with(template)
        .mount(server)
        .await;
}

fn fetcher(server: &MockServer) -> ChapterFetcher {
    let mut api = ApiConfig::new("mock", format!("{}/content", server.uri()));
    api.is_plain_text = true;
    api.concurrency = 2;
    ChapterFetcher::new(
        client(),
        api,
        RetryPolicy::exponential(0, Duration::from_millis(10)),
    )
}

fn fast_download_config() -> DownloadConfig {
    DownloadConfig {
        max_retries: 0,
        retry_base_delay: 10,
        retry_jitter: 0,
        batch_retry_passes: 2,
        batch_retry_delay: 20,
        window_pause_min: 0,
        window_pause_max: 10,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_book_download_writes_txt() {
    let server = MockServer::start().await;
    let ids = ["101", "102", "103", "104", "105"];
    mount_book(&server, &ids).await;
    for id in ids {
        mount_chapter(&server, id, 200).await;
    }

    let book_api = BookApi::new(
        client(),
        book_api_config(&server),
        RetryPolicy::exponential(1, Duration::from_millis(10)),
    );
    let info = book_api.fetch_book_info(BOOK_ID).await.unwrap();
    let chapters = book_api.fetch_chapters(BOOK_ID).await.unwrap();
    assert_eq!(info.name, "星海/纪元");
    assert_eq!(chapters.len(), 5);

    let mut downloader = BatchDownloader::from_config(fetcher(&server), &fast_download_config());
    let results = downloader.download_batch(&chapters).await;

    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["第101号", "第102号", "第103号", "第104号", "第105号"]);
    assert_eq!(downloader.stats().success, 5);

    let dir = TempDir::new().unwrap();
    let file = write_txt(dir.path(), &info, &results).unwrap();
    assert_eq!(file, dir.path().join("星海纪元.txt"));

    let txt = std::fs::read_to_string(&file).unwrap();
    assert!(txt.starts_with("书名：星海/纪元\n作者：某人\n字数：25万字\n章节数：5\n"));
    assert!(txt.contains("第103号\n\n  内容103\n\n第104号"));
}

#[tokio::test]
async fn test_auto_retry_gives_up_on_permanent_failures() {
    let server = MockServer::start().await;
    let ids = ["1", "2", "3", "4"];
    mount_book(&server, &ids).await;
    for id in ["1", "3"] {
        mount_chapter(&server, id, 200).await;
    }
    for id in ["2", "4"] {
        Mock::given(method("GET"))
            .and(path("/content"))
            .and(query_param("item_id", id))
            .respond_with(ResponseTemplate::new(500))
            // First pass plus two auto-retry passes
            .expect(3)
            .mount(&server)
            .await;
    }

    let book_api = BookApi::new(
        client(),
        book_api_config(&server),
        RetryPolicy::exponential(0, Duration::from_millis(10)),
    );
    let chapters = book_api.fetch_chapters(BOOK_ID).await.unwrap();

    let config = fast_download_config();
    let mut downloader = BatchDownloader::from_config(fetcher(&server), &config);
    let results = downloader.download_batch(&chapters).await;

    let stats = downloader.stats();
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.retried, 4);
    assert!(!results[1].success);
    assert_eq!(results[1].title, "第2章 名");
    assert!(results[2].success);
}

#[tokio::test]
async fn test_auto_retry_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let chapters = vec![chapter_ripple::ChapterDescriptor::new("1", "第1章")];
    let config = DownloadConfig {
        auto_retry: false,
        ..fast_download_config()
    };
    assert!(AutoRetryCoordinator::from_config(&config).is_none());

    let mut downloader = BatchDownloader::from_config(fetcher(&server), &config);
    let results = downloader.download_batch(&chapters).await;
    assert!(!results[0].success);
    assert_eq!(downloader.stats().failed, 1);
}
