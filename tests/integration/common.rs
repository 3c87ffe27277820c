//! Shared helpers for integration tests

use trawl::config::{
    Config, CrawlerConfig, OutputConfig, RankConfig, SeedConfig, UserAgentConfig,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seeds`
pub fn create_test_config(seeds: Vec<String>, max_depth: u32, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            timeout_secs: 2,
            workers: 4,
            max_pages: None,
            deadline_secs: None,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        rank: RankConfig::default(),
        seeds: SeedConfig {
            urls: seeds,
            file: None,
        },
    }
}

/// Serves `body` as an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Serves an HTML page at `route` that must never be requested
pub async fn mount_unreachable_page(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<p>never</p>".to_string(), "text/html"),
        )
        .expect(0)
        .mount(server)
        .await;
}

/// A minimal page with a title, some body text and links
pub fn page(title: &str, text: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
        title, text, anchors
    )
}
