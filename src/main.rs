//! Trawl main entry point
//!
//! This is the command-line interface for the Trawl search engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trawl::config::{load_config_with_hash, Config};
use trawl::output::{load_statistics, print_statistics};
use trawl::{Crawler, QueryEngine, SearchIndex};
use tracing_subscriber::EnvFilter;

/// Trawl: a small web search engine
///
/// Trawl crawls pages from a set of seed URLs, builds an inverted index and a
/// link graph, scores documents by link authority and answers single-word
/// queries ordered by that score.
#[derive(Parser, Debug)]
#[command(name = "trawl")]
#[command(version)]
#[command(about = "A small web search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from the configured seeds, then recompute ranks
    Crawl,

    /// Recompute ranks from the stored link graph
    Rank,

    /// Find documents containing a word, best ranked first
    Search {
        /// The word to look up
        word: String,

        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show statistics from the database
    Stats {
        /// Number of top ranked documents to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Validate config and show what would be crawled without crawling
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Crawl => handle_crawl(config, config_hash).await,
        Command::Rank => handle_rank(&config),
        Command::Search { word, limit } => handle_search(&config, &word, limit),
        Command::Stats { top } => handle_stats(&config, top),
        Command::Check => handle_check(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawl=info,warn"),
            1 => EnvFilter::new("trawl=debug,info"),
            2 => EnvFilter::new("trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_index(config: &Config) -> anyhow::Result<SearchIndex> {
    let path = Path::new(&config.output.database_path);
    SearchIndex::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Handles `check`: validates config and shows what would be crawled
fn handle_check(config: &Config) -> anyhow::Result<()> {
    println!("=== Trawl Configuration Check ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Fetch timeout: {}s", config.crawler.timeout_secs);
    println!("  Workers: {}", config.crawler.workers);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    match config.crawler.deadline_secs {
        Some(secs) => println!("  Deadline: {}s", secs),
        None => println!("  Deadline: none"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nRank:");
    println!("  Damping factor: {}", config.rank.damping_factor);
    println!("  Tolerance: {}", config.rank.tolerance);
    println!("  Max iterations: {}", config.rank.max_iterations);

    println!("\nSeeds ({}):", config.seeds.urls.len());
    for seed in &config.seeds.urls {
        println!("  - {}", trawl::resolve(seed, ""));
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.seeds.urls.len()
    );

    Ok(())
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(config: &Config, top: usize) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let index = open_index(config)?;
    let stats = {
        let storage = index.storage().lock();
        load_statistics(&*storage, top)?
    };

    print_statistics(&stats);

    Ok(())
}

/// Handles `rank`: recomputes and stores ranks
fn handle_rank(config: &Config) -> anyhow::Result<()> {
    let index = open_index(config)?;
    let ranks = index.refresh_ranks(&config.rank)?;

    println!("✓ Ranked {} documents", ranks.len());
    Ok(())
}

/// Handles `search`: prints matching documents best ranked first
fn handle_search(config: &Config, word: &str, limit: usize) -> anyhow::Result<()> {
    let index = Arc::new(open_index(config)?);
    let engine = QueryEngine::new(index, config.rank.clone());

    match engine.search_documents(word)? {
        None => println!("No documents contain \"{}\"", word),
        Some(hits) => {
            println!("{} documents contain \"{}\"\n", hits.len(), word);
            for hit in hits.iter().take(limit) {
                let title = if hit.title.is_empty() {
                    "(untitled)"
                } else {
                    hit.title.as_str()
                };
                println!("  {:.6}  {}  {}", hit.score, hit.url, title);
            }
        }
    }

    Ok(())
}

/// Handles `crawl`: crawls the seeds and recomputes ranks
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    tracing::info!("Total seed URLs: {}", config.seeds.urls.len());

    let rank_config = config.rank.clone();
    let index = Arc::new(open_index(&config)?);
    let crawler = Crawler::new(config, Arc::clone(&index))?.with_config_hash(config_hash);

    // Ctrl-C stops claiming new pages; in-flight pages still finish
    let token = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            token.cancel();
        }
    });

    let report = crawler.crawl().await.context("Crawl failed")?;

    let ranks = index.refresh_ranks(&rank_config)?;
    tracing::info!("Ranked {} documents", ranks.len());

    println!("=== Crawl Report ===\n");
    println!("  Run: {}", report.run_id);
    println!("  Pages indexed: {}", report.pages_indexed);
    println!("  Pages skipped: {}", report.pages_skipped);
    for (kind, count) in &report.skipped_by_kind {
        println!("    {}: {}", kind, count);
    }
    println!("  Documents known: {}", report.documents);
    println!("  Words known: {}", report.words);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    if report.cancelled {
        println!("  Stopped early (interrupted or deadline reached)");
    }

    Ok(())
}
