use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub rank: RankConfig,
    pub seeds: SeedConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Frontier entries deeper than this are dropped (seeds are depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Timeout for a single page fetch, in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of pages fetched and indexed concurrently
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Ceiling on the number of pages claimed from the frontier
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u64>,

    /// Overall deadline for a crawl run, in seconds
    #[serde(rename = "deadline-secs", default)]
    pub deadline_secs: Option<u64>,
}

impl CrawlerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// PageRank parameters
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RankConfig {
    /// Probability of following a link rather than jumping to a random page
    #[serde(rename = "damping-factor", default = "default_damping_factor")]
    pub damping_factor: f64,

    /// Iteration stops once the L1 change of the score vector drops below this
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Hard cap on power iterations
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping_factor: default_damping_factor(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Seed URL sources
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Seed URLs listed inline
    #[serde(default)]
    pub urls: Vec<String>,

    /// File with one seed URL per line
    #[serde(default)]
    pub file: Option<String>,
}

fn default_timeout_secs() -> u64 {
    3
}

fn default_workers() -> u32 {
    4
}

fn default_damping_factor() -> f64 {
    0.85
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> u32 {
    100
}
