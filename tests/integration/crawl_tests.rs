//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::common::{create_test_config, mount_page, mount_unreachable_page, page};
use std::sync::Arc;
use trawl::storage::{RunStatus, Storage};
use trawl::{Crawler, SearchIndex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &page("Home", "Welcome crawlers", &["/page1", "/page2#section"]),
    )
    .await;
    mount_page(&mock_server, "/page1", &page("Page One", "first content", &["/"])).await;
    mount_page(&mock_server, "/page2", &page("Page Two", "second content", &[])).await;

    let index = Arc::new(SearchIndex::in_memory().expect("Failed to create index"));
    let config = create_test_config(vec![format!("{}/", base_url)], 2, ":memory:");
    let crawler = Crawler::new(config, Arc::clone(&index)).expect("Failed to create crawler");

    let report = crawler.crawl().await.expect("Crawl failed");

    assert_eq!(report.pages_indexed, 3);
    assert_eq!(report.pages_skipped, 0);
    assert!(!report.cancelled);
    assert_eq!(report.documents, 3);

    let home = index.document_id(&format!("{}/", base_url)).unwrap();
    let page1 = index.document_id(&format!("{}/page1", base_url)).unwrap();
    let page2 = index.document_id(&format!("{}/page2", base_url)).unwrap();
    assert_eq!(index.document(home).unwrap().title, "Home");
    assert_eq!(index.document(page2).unwrap().title, "Page Two");
    assert_eq!(index.link_count(home, page1), 1);
    assert_eq!(index.link_count(page1, home), 1);

    let content = index.word_id("content").expect("word should be indexed");
    let mut docs = index.postings(content).unwrap();
    docs.sort();
    let mut expected = vec![page1, page2];
    expected.sort();
    assert_eq!(docs, expected);

    let run = index.storage().lock().get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.pages_indexed, 3);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &page("Root", "depth zero", &["/one"])).await;
    mount_page(&mock_server, "/one", &page("One", "depth one", &["/two"])).await;
    mount_unreachable_page(&mock_server, "/two").await;

    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let config = create_test_config(vec![format!("{}/", base_url)], 1, ":memory:");
    let crawler = Crawler::new(config, Arc::clone(&index)).unwrap();

    let report = crawler.crawl().await.unwrap();

    assert_eq!(report.pages_indexed, 2);

    // The page beyond the depth limit still gets a document id and an edge
    let one = index.document_id(&format!("{}/one", base_url)).unwrap();
    let two = index.document_id(&format!("{}/two", base_url)).unwrap();
    assert_eq!(index.link_count(one, two), 1);
    assert_eq!(index.document(two).unwrap().title, "");
    assert_eq!(report.documents, 3);
}

#[tokio::test]
async fn test_fetch_failures_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &page("Root", "root", &["/missing", "/data.json", "/ok"]),
    )
    .await;
    mount_page(&mock_server, "/ok", &page("Ok", "fine", &[])).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"not": "html"}"#.to_string(),
            "application/json",
        ))
        .mount(&mock_server)
        .await;


    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let config = create_test_config(vec![format!("{}/", base_url)], 2, ":memory:");
    let crawler = Crawler::new(config, Arc::clone(&index)).unwrap();

    let report = crawler.crawl().await.unwrap();

    assert_eq!(report.pages_indexed, 2);
    assert_eq!(report.pages_skipped, 2);
    assert_eq!(report.skipped_by_kind.get("status"), Some(&1));
    assert_eq!(report.skipped_by_kind.get("content-type"), Some(&1));

    let missing = index.document_id(&format!("{}/missing", base_url)).unwrap();
    assert!(index.document(missing).is_some());
}

#[tokio::test]
async fn test_non_utf8_pages_are_decoded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &page("Root", "root", &["/latin1", "/undeclared"])).await;

    // "café rust" in ISO-8859-1
    let mut latin1 = b"<html><head><title>Menu</title></head><body><p>caf".to_vec();
    latin1.extend_from_slice(&[0xe9]);
    latin1.extend_from_slice(b" rust</p></body></html>");
    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(latin1, "text/html; charset=iso-8859-1"),
        )
        .mount(&mock_server)
        .await;

    let mut undeclared = b"<p>stray ".to_vec();
    undeclared.extend_from_slice(&[0xff, 0xfe]);
    undeclared.extend_from_slice(b" bytes</p>");
    Mock::given(method("GET"))
        .and(path("/undeclared"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(undeclared, "text/html"))
        .mount(&mock_server)
        .await;

    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let config = create_test_config(vec![format!("{}/", base_url)], 1, ":memory:");
    let crawler = Crawler::new(config, Arc::clone(&index)).unwrap();

    let report = crawler.crawl().await.unwrap();

    assert_eq!(report.pages_indexed, 3);
    assert_eq!(report.pages_skipped, 0);

    let latin1 = index.document_id(&format!("{}/latin1", base_url)).unwrap();
    assert_eq!(index.document(latin1).unwrap().title, "Menu");
    let cafe = index.word_id("café").expect("decoded word should be indexed");
    assert_eq!(index.postings(cafe).unwrap(), vec![latin1]);

    // Invalid UTF-8 without a declared charset is replaced, not rejected
    let undeclared = index.document_id(&format!("{}/undeclared", base_url)).unwrap();
    let bytes = index.word_id("bytes").unwrap();
    assert_eq!(index.postings(bytes).unwrap(), vec![undeclared]);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &page("Root", "root", &["/slow"])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>late</p>".to_string(), "text/html")
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let mut config = create_test_config(vec![format!("{}/", base_url)], 1, ":memory:");
    config.crawler.timeout_secs = 1;
    let crawler = Crawler::new(config, Arc::clone(&index)).unwrap();

    let report = crawler.crawl().await.unwrap();

    assert_eq!(report.pages_indexed, 1);
    assert_eq!(report.skipped_by_kind.get("timeout"), Some(&1));
}

#[tokio::test]
async fn test_max_pages_ceiling() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &page("Root", "root", &["/a", "/b"])).await;
    mount_unreachable_page(&mock_server, "/a").await;
    mount_unreachable_page(&mock_server, "/b").await;

    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let mut config = create_test_config(vec![format!("{}/", base_url)], 3, ":memory:");
    config.crawler.max_pages = Some(1);
    let crawler = Crawler::new(config, Arc::clone(&index)).unwrap();

    let report = crawler.crawl().await.unwrap();

    assert_eq!(report.pages_indexed, 1);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &page("Home", "alpha beta", &["/x", "/x", "/y"])).await;
    mount_page(&mock_server, "/x", &page("X", "beta gamma", &["/"])).await;
    mount_page(&mock_server, "/y", &page("Y", "delta", &[])).await;

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("trawl.db");
    let seeds = vec![format!("{}/", base_url)];

    let (documents, words, inverted) = {
        let index = Arc::new(SearchIndex::open(&db_path).unwrap());
        let config = create_test_config(seeds.clone(), 2, db_path.to_str().unwrap());
        Crawler::new(config, Arc::clone(&index))
            .unwrap()
            .crawl()
            .await
            .unwrap();
        (
            index.document_count(),
            index.word_count(),
            index.resolved_inverted_index(),
        )
    };

    let index = Arc::new(SearchIndex::open(&db_path).unwrap());
    let config = create_test_config(seeds, 2, db_path.to_str().unwrap());
    let report = Crawler::new(config, Arc::clone(&index))
        .unwrap()
        .crawl()
        .await
        .unwrap();

    assert_eq!(report.pages_indexed, 3);
    assert_eq!(index.document_count(), documents);
    assert_eq!(index.word_count(), words);
    assert_eq!(index.resolved_inverted_index(), inverted);

    let home = index.document_id(&format!("{}/", base_url)).unwrap();
    let x = index.document_id(&format!("{}/x", base_url)).unwrap();
    assert_eq!(index.link_count(home, x), 2);

    let storage = index.storage().lock();
    assert_eq!(storage.count_documents().unwrap(), documents as u64);
    assert_eq!(storage.count_words().unwrap(), words as u64);
    assert_eq!(storage.get_latest_run().unwrap().unwrap().id, report.run_id);
}

#[tokio::test]
async fn test_cancelled_crawl_is_interrupted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Root", "root", &["/next"]), "text/html")
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    mount_unreachable_page(&mock_server, "/next").await;

    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let config = create_test_config(vec![format!("{}/", base_url)], 2, ":memory:");
    let crawler = Crawler::new(config, Arc::clone(&index)).unwrap();

    let token = crawler.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        token.cancel();
    });

    let report = crawler.crawl().await.unwrap();

    // The in-flight page finishes, its links are not followed
    assert!(report.cancelled);
    assert_eq!(report.pages_indexed, 1);
    let run = index.storage().lock().get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Interrupted);
}

#[tokio::test]
async fn test_deadline_stops_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Root", "root", &["/next"]), "text/html")
                .set_delay(std::time::Duration::from_millis(1500)),
        )
        .mount(&mock_server)
        .await;
    mount_unreachable_page(&mock_server, "/next").await;

    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let mut config = create_test_config(vec![format!("{}/", base_url)], 2, ":memory:");
    config.crawler.timeout_secs = 3;
    config.crawler.deadline_secs = Some(1);
    let crawler = Crawler::new(config, Arc::clone(&index)).unwrap();

    let report = crawler.crawl().await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.pages_indexed, 1);
}
