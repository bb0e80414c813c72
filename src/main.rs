//! Chapter-Ripple main entry point
//!
//! This is the command-line interface for the Chapter-Ripple downloader.

use anyhow::{bail, Context};
use chapter_ripple::book::{parse_book_input, BookApi};
use chapter_ripple::config::{load_config_with_hash, ApiRegistry, Config};
use chapter_ripple::download::{
    print_statistics, BatchDownloader, ChapterFetcher, DownloadStats, HttpClient, ReqwestClient,
};
use chapter_ripple::extract::FormatTarget;
use chapter_ripple::output::{write_chapter_txt, write_txt};
use chapter_ripple::RetryPolicy;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Chapter-Ripple: a polite web novel chapter downloader
///
/// Chapter-Ripple fetches chapters through a configurable third-party content
/// API, downloads whole books in small concurrent windows, retries failures
/// and writes the result as a TXT book.
#[derive(Parser, Debug)]
#[command(name = "chapter-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A polite web novel chapter downloader", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the configured APIs without downloading
    #[arg(long, conflicts_with_all = ["page_url", "book"])]
    dry_run: bool,

    /// Use the API at this index instead of `current-api`
    #[arg(long, value_name = "INDEX")]
    api: Option<usize>,

    /// Download the chapter shown by a reader page URL
    #[arg(long, value_name = "URL", conflicts_with = "book")]
    page_url: Option<String>,

    /// Print the chapter as paragraph markup instead of plain text
    #[arg(long, requires = "page_url")]
    markup: bool,

    /// Also save the chapter as a TXT file in the output directory
    #[arg(long, requires = "page_url", conflicts_with = "markup")]
    save: bool,

    /// Download a whole book by id or book page URL
    #[arg(long, value_name = "ID|URL")]
    book: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let mut registry = ApiRegistry::from_config(&config)?;
    if let Some(index) = cli.api {
        registry.select(index)?;
    }

    if cli.dry_run {
        handle_dry_run(&config, &registry);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let client: Arc<dyn HttpClient> = Arc::new(
        ReqwestClient::new(&config.download.user_agent).context("Failed to build HTTP client")?,
    );

    if let Some(page_url) = &cli.page_url {
        let target = if cli.markup {
            FormatTarget::Markup
        } else {
            FormatTarget::PlainText
        };
        handle_page(&config, &registry, client, cancel, page_url, target, cli.save).await
    } else if let Some(book) = &cli.book {
        handle_book(&config, &registry, client, cancel, book).await
    } else {
        bail!("Nothing to do: pass --page-url, --book or --dry-run");
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("chapter_ripple=info,warn"),
            1 => EnvFilter::new("chapter_ripple=debug,info"),
            2 => EnvFilter::new("chapter_ripple=trace,debug"),
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

/// Cancels all in-flight work on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling downloads");
            cancel.cancel();
        }
    });
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config, registry: &ApiRegistry) {
    println!("=== Chapter-Ripple Dry Run ===\n");

    println!("Download Configuration:");
    println!("  Max retries: {}", config.download.max_retries);
    println!("  Retry base delay: {}ms", config.download.retry_base_delay);
    println!("  Retry jitter: {}ms", config.download.retry_jitter);
    println!(
        "  Auto-retry: {} ({} passes, {}ms step)",
        config.download.auto_retry,
        config.download.batch_retry_passes,
        config.download.batch_retry_delay
    );
    println!(
        "  Window pause: {}-{}ms",
        config.download.window_pause_min, config.download.window_pause_max
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\nContent APIs ({}):", registry.len());
    for (index, api) in registry.apis().iter().enumerate() {
        let marker = if index == registry.current_index() {
            "*"
        } else {
            " "
        };
        println!(
            "  {} [{}] {} ({:?}, concurrency {}, timeout {}ms)",
            marker, index, api.name, api.response_shape, api.concurrency, api.timeout
        );
        println!("        {}", api.url_template);
    }

    let inner = RetryPolicy::chapter(&config.download);
    let outer = RetryPolicy::batch(&config.download);
    println!("\n✓ Configuration is valid");
    println!(
        "✓ Worst case {} attempts per chapter",
        chapter_ripple::download::worst_case_attempts(&inner, &outer)
    );
}

fn chapter_fetcher(
    config: &Config,
    registry: &ApiRegistry,
    client: Arc<dyn HttpClient>,
    cancel: CancellationToken,
) -> ChapterFetcher {
    let api = registry.current().clone();
    tracing::info!("Using content API: {}", api.name);
    ChapterFetcher::new(client, api, RetryPolicy::chapter(&config.download)).with_cancellation(cancel)
}

/// Handles --page-url: fetches and prints a single chapter
async fn handle_page(
    config: &Config,
    registry: &ApiRegistry,
    client: Arc<dyn HttpClient>,
    cancel: CancellationToken,
    page_url: &str,
    target: FormatTarget,
    save: bool,
) -> anyhow::Result<()> {
    let page_url = Url::parse(page_url).with_context(|| format!("Invalid page URL: {}", page_url))?;
    let fetcher = chapter_fetcher(config, registry, client, cancel);

    let chapter = fetcher.fetch_for_page(&page_url, target).await?;
    tracing::info!("Fetched chapter: {}", chapter.title);

    if save {
        let path = write_chapter_txt(Path::new(&config.output.directory), &chapter)?;
        println!("✓ Chapter saved to: {}", path.display());
    } else {
        println!("{}\n\n{}", chapter.title, chapter.content);
    }

    Ok(())
}

/// Handles --book: downloads every chapter and writes a TXT book
async fn handle_book(
    config: &Config,
    registry: &ApiRegistry,
    client: Arc<dyn HttpClient>,
    cancel: CancellationToken,
    book: &str,
) -> anyhow::Result<()> {
    let book_id = parse_book_input(book)?;
    tracing::info!("Book id: {}", book_id);

    let book_api = BookApi::new(
        client.clone(),
        config.book_api.clone(),
        RetryPolicy::chapter(&config.download),
    )
    .with_cancellation(cancel.clone());

    let info = book_api.fetch_book_info(&book_id).await?;
    let chapters = book_api.fetch_chapters(&book_id).await?;
    tracing::info!("Downloading \"{}\" ({} chapters)", info.name, chapters.len());

    let progress = |stats: &DownloadStats| {
        tracing::info!(
            "Progress: {:.0}% ({} ok, {} failed)",
            stats.fraction_complete() * 100.0,
            stats.success,
            stats.failed
        );
    };
    let mut downloader =
        BatchDownloader::from_config(chapter_fetcher(config, registry, client, cancel), &config.download)
            .with_progress(Arc::new(progress));

    let results = downloader.download_batch(&chapters).await;
    print_statistics(downloader.stats());

    let path = write_txt(Path::new(&config.output.directory), &info, &results)?;
    println!("\n✓ Book written to: {}", path.display());

    Ok(())
}
