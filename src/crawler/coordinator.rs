//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives a bounded pool of worker
//! tasks over the shared frontier:
//! - Seeding the frontier and recording the run
//! - Claiming entries and spawning fetch/parse/index tasks
//! - Feeding discovered links back into the frontier
//! - Handling cancellation, the run deadline and fatal storage errors

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::parse_document;
use crate::crawler::traversal::scan_page;
use crate::crawler::PageError;
use crate::index::{IndexedPage, SearchIndex};
use crate::storage::{RunStatus, Storage};
use crate::{Result, TrawlError};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// How often progress is logged, in processed pages
const PROGRESS_INTERVAL: u64 = 10;

/// Summary of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub run_id: i64,
    pub pages_indexed: u64,
    pub pages_skipped: u64,
    /// Skipped pages grouped by failure kind
    pub skipped_by_kind: BTreeMap<&'static str, u64>,
    /// Documents known after the run, fetched or not
    pub documents: usize,
    pub words: usize,
    pub elapsed: Duration,
    /// Set when the run stopped on cancellation or its deadline
    pub cancelled: bool,
}

impl CrawlReport {
    fn record_skip(&mut self, error: &PageError) {
        self.pages_skipped += 1;
        *self.skipped_by_kind.entry(error.kind()).or_insert(0) += 1;
    }
}

/// Result of processing one frontier entry
enum PageOutcome {
    Indexed {
        entry: FrontierEntry,
        page: IndexedPage,
        links: Vec<String>,
    },
    Skipped {
        entry: FrontierEntry,
        error: PageError,
    },
}

/// Main crawler structure
pub struct Crawler {
    config: Arc<Config>,
    index: Arc<SearchIndex>,
    client: Client,
    cancel: CancellationToken,
    config_hash: String,
}

impl Crawler {
    /// Creates a crawler that publishes into `index`
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `index` - The shared index pages are published into
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(TrawlError)` - The HTTP client could not be built
    pub fn new(config: Config, index: Arc<SearchIndex>) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.crawler.timeout())?;

        Ok(Self {
            config: Arc::new(config),
            index,
            client,
            cancel: CancellationToken::new(),
            config_hash: String::new(),
        })
    }

    /// Sets the configuration hash recorded with each run
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Token that stops the crawl when cancelled
    ///
    /// Cancelling stops new frontier entries from being claimed or enqueued;
    /// pages already in flight finish (or time out) and are published.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    /// Crawls from the configured seeds
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let seeds = self.config.seeds.urls.clone();
        self.crawl_seeds(&seeds).await
    }

    /// Crawls from `seeds`, each entering the frontier at depth 0
    pub async fn crawl_seeds(&self, seeds: &[String]) -> Result<CrawlReport> {
        let run_id = self.index.storage().lock().create_run(&self.config_hash)?;
        tracing::info!("Starting crawl run {}", run_id);

        let mut report = CrawlReport {
            run_id,
            ..CrawlReport::default()
        };

        match self.run(seeds, &mut report).await {
            Ok(()) => {
                let status = if report.cancelled {
                    RunStatus::Interrupted
                } else {
                    RunStatus::Completed
                };
                self.index
                    .storage()
                    .lock()
                    .finish_run(run_id, status, report.pages_indexed)?;

                report.documents = self.index.document_count();
                report.words = self.index.word_count();
                tracing::info!(
                    "Crawl {}: {} pages indexed, {} skipped in {:?}",
                    status.to_db_string(),
                    report.pages_indexed,
                    report.pages_skipped,
                    report.elapsed
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Crawl run {} failed: {}", run_id, e);
                if let Err(finish_err) = self.index.storage().lock().finish_run(
                    run_id,
                    RunStatus::Failed,
                    report.pages_indexed,
                ) {
                    tracing::error!("Could not mark run {} failed: {}", run_id, finish_err);
                }
                Err(e)
            }
        }
    }

    /// The crawl loop proper
    ///
    /// Keeps at most `workers` tasks in flight. The loop ends when nothing is
    /// in flight and nothing can be claimed. A fatal error aborts every task.
    async fn run(&self, seeds: &[String], report: &mut CrawlReport) -> Result<()> {
        let started = Instant::now();
        let crawler = &self.config.crawler;
        let frontier = Frontier::new(crawler.max_depth, crawler.max_pages);
        let seeded = frontier.seed(seeds);
        tracing::info!("Seeded frontier with {} URLs", seeded);

        let deadline = crawler.deadline().map(|d| tokio::time::Instant::now() + d);
        let workers = crawler.workers.max(1) as usize;
        let timeout = crawler.timeout();
        let mut tasks: JoinSet<Result<PageOutcome>> = JoinSet::new();

        loop {
            if !frontier.is_closed() && self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, finishing in-flight pages");
                frontier.close();
                report.cancelled = true;
            }

            while tasks.len() < workers {
                let Some(entry) = frontier.claim() else {
                    break;
                };
                tracing::debug!(url = %entry.url, depth = entry.depth, "Claimed");

                let index = Arc::clone(&self.index);
                let client = self.client.clone();
                tasks.spawn(process_entry(index, client, entry, timeout));
            }

            if tasks.is_empty() {
                break;
            }

            let joined = tokio::select! {
                joined = tasks.join_next() => joined,
                _ = self.cancel.cancelled(), if !frontier.is_closed() => continue,
                _ = sleep_until(deadline), if !frontier.is_closed() => {
                    tracing::info!("Crawl deadline reached, finishing in-flight pages");
                    frontier.close();
                    report.cancelled = true;
                    continue;
                }
            };

            let Some(joined) = joined else {
                continue;
            };

            let outcome = match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    self.cancel.cancel();
                    tasks.shutdown().await;
                    report.elapsed = started.elapsed();
                    return Err(e);
                }
                Err(join_err) => {
                    self.cancel.cancel();
                    tasks.shutdown().await;
                    report.elapsed = started.elapsed();
                    return Err(TrawlError::Worker(join_err.to_string()));
                }
            };

            match outcome {
                PageOutcome::Indexed { entry, page, links } => {
                    report.pages_indexed += 1;
                    tracing::debug!(
                        url = %entry.url,
                        doc_id = page.doc_id,
                        words = page.occurrences.len(),
                        links = links.len(),
                        "Indexed"
                    );
                    for link in links {
                        frontier.push(link, entry.depth + 1);
                    }
                }
                PageOutcome::Skipped { entry, error } => {
                    tracing::warn!("Skipping {}: {}", entry.url, error);
                    report.record_skip(&error);
                }
            }

            let processed = report.pages_indexed + report.pages_skipped;
            if processed % PROGRESS_INTERVAL == 0 {
                let elapsed = started.elapsed();
                tracing::info!(
                    "Progress: {} pages processed, {} in frontier, {:.2} pages/sec",
                    processed,
                    frontier.pending(),
                    processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
                );
            }
        }

        if frontier.ceiling_reached() {
            tracing::info!("Page ceiling of {} reached", frontier.claimed());
        }
        report.elapsed = started.elapsed();
        Ok(())
    }
}

/// Sleeps until `deadline`, or forever when there is none
async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Fetches, parses, traverses and publishes one page
///
/// Fetch and parse failures cost only this page. Storage failures are fatal
/// and propagate.
async fn process_entry(
    index: Arc<SearchIndex>,
    client: Client,
    entry: FrontierEntry,
    timeout: Duration,
) -> Result<PageOutcome> {
    let doc_id = index.document_id(&entry.url)?;

    let body = match fetch_page(&client, &entry.url, timeout).await {
        Ok(body) => body,
        Err(e) => {
            return Ok(PageOutcome::Skipped {
                entry,
                error: e.into(),
            })
        }
    };

    let scan = match parse_document(&body) {
        Ok(tree) => scan_page(&tree, &entry.url),
        Err(e) => {
            return Ok(PageOutcome::Skipped {
                entry,
                error: e.into(),
            })
        }
    };

    let page = index.index_page(doc_id, &scan)?;
    Ok(PageOutcome::Indexed {
        entry,
        page,
        links: scan.links,
    })
}

/// Opens the configured database, crawls the configured seeds and refreshes
/// ranks
///
/// # Example
///
/// ```no_run
/// use trawl::config::load_config;
/// use trawl::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("trawl.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} pages indexed", report.pages_indexed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let index = Arc::new(SearchIndex::open(std::path::Path::new(
        &config.output.database_path,
    ))?);
    let rank_config = config.rank.clone();

    let crawler = Crawler::new(config, Arc::clone(&index))?;
    let report = crawler.crawl().await?;
    index.refresh_ranks(&rank_config)?;

    Ok(report)
}
