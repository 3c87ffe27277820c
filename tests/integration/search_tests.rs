//! Integration tests for ranking and search over a crawled site

use crate::common::{create_test_config, mount_page, page};
use std::path::Path;
use std::sync::Arc;
use trawl::config::{load_config, RankConfig};
use trawl::crawler::run_crawl;
use trawl::storage::Storage;
use trawl::{Crawler, QueryEngine, SearchIndex};
use wiremock::MockServer;

/// Mounts a small site where `/c` collects the most inbound links
///
/// ```text
/// /  -> /a /b /c
/// /a -> /c
/// /b -> /c
/// /c -> /
/// ```
async fn mount_site(server: &MockServer) {
    mount_page(server, "/", &page("Root", "hub", &["/a", "/b", "/c"])).await;
    mount_page(server, "/a", &page("A", "crab rust", &["/c"])).await;
    mount_page(server, "/b", &page("B", "rust", &["/c"])).await;
    mount_page(server, "/c", &page("C", "crab", &["/"])).await;
}

#[tokio::test]
async fn test_search_orders_by_link_authority() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let index = Arc::new(SearchIndex::in_memory().unwrap());
    let config = create_test_config(vec![format!("{}/", base_url)], 3, ":memory:");
    Crawler::new(config, Arc::clone(&index))
        .unwrap()
        .crawl()
        .await
        .unwrap();

    let engine = QueryEngine::new(Arc::clone(&index), RankConfig::default());

    let hits = engine.search_documents("Crab").unwrap().expect("crab is indexed");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, format!("{}/c", base_url));
    assert_eq!(hits[0].title, "C");
    assert_eq!(hits[1].url, format!("{}/a", base_url));

    let rust = engine.search("rust").unwrap().unwrap();
    assert_eq!(rust.len(), 2);
    let ranks = index.ranks(&RankConfig::default()).unwrap();
    assert!(ranks[&rust[0]] >= ranks[&rust[1]]);

    assert_eq!(engine.search("octopus").unwrap(), None);

    // Every known document has exactly one score and they sum to 1
    assert_eq!(ranks.len(), index.document_count());
    let total: f64 = ranks.values().sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_run_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("seeds.txt"),
        format!("# seed list\n\n{}/\n", base_url),
    )
    .unwrap();

    let db_path = dir.path().join("trawl.db");
    let config_path = dir.path().join("trawl.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[crawler]
max-depth = 3
timeout-secs = 2
workers = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
database-path = "{}"

[seeds]
file = "seeds.txt"
"#,
            db_path.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.seeds.urls, vec![format!("{}/", base_url)]);

    let report = run_crawl(config).await.unwrap();
    assert_eq!(report.pages_indexed, 4);

    // Ranks were persisted with the crawl; a fresh process can query them
    let index = Arc::new(SearchIndex::open(Path::new(&db_path)).unwrap());
    assert_eq!(index.storage().lock().count_ranks().unwrap(), 4);

    let engine = QueryEngine::new(index, RankConfig::default());
    let hits = engine.search_documents("hub").unwrap().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Root");
}
