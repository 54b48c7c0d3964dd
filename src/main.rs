//! CLI entry point for the biblesync tool.

use std::io::{self, Write as _};
use std::sync::Arc;

use anyhow::Result;
use biblesync_core::{
    Database, DownloadController, JobError, JobStatus, NetworkStatusMonitor,
    OfflineStatsAggregator, SearchIndex, VerseCache, VerseFetchClient, VerseSource, canon,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let db = Database::new(&args.db).await?;
    let cache = Arc::new(VerseCache::new(db));
    let client: Arc<dyn VerseSource> = Arc::new(VerseFetchClient::new());
    // Fail open: a failed fetch is the authoritative signal of
    // unreachability, not this monitor.
    let monitor = NetworkStatusMonitor::new();

    match args.command {
        Command::Download { book } => {
            run_download(&book, Arc::clone(&cache), client, monitor).await
        }
        Command::Read { book, chapter } => run_read(&book, chapter, &cache, &client).await,
        Command::Search { query } => run_search(&query, cache, client, monitor).await,
        Command::Stats => run_stats(cache).await,
        Command::Books { downloaded } => run_books(&cache, downloaded).await,
        Command::Clear { yes } => run_clear(&cache, yes).await,
    }
}

/// Downloads one book with a progress bar and Ctrl-C cancellation.
async fn run_download(
    book_name: &str,
    cache: Arc<VerseCache>,
    client: Arc<dyn VerseSource>,
    monitor: NetworkStatusMonitor,
) -> Result<()> {
    let Some(book) = canon::find_book(book_name) else {
        println!("Unknown book: {book_name}");
        return Ok(());
    };

    let controller = Arc::new(DownloadController::new(cache, client, monitor));

    // Cooperative cancel on Ctrl-C; chapters already cached are kept
    let cancel_target = Arc::clone(&controller);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_target.cancel();
        }
    });

    let bar = ProgressBar::new(u64::from(book.chapters));
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(book.name.to_string());

    let mut rx = controller.subscribe();
    let bar_handle = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let progress = rx.borrow().clone();
                bar.set_position(u64::from(progress.current));
                if !progress.failed_chapters.is_empty() {
                    bar.set_message(format!(
                        "{} ({} failed)",
                        progress.book,
                        progress.failed_chapters.len()
                    ));
                }
                if progress.status.is_terminal() {
                    break;
                }
            }
        })
    };

    info!(book = book.name, "starting download");
    let result = controller.download_book(book.name).await;
    if result.is_err() {
        // Rejected starts never publish progress; don't wait on the bar task
        bar_handle.abort();
    }
    let _ = bar_handle.await;
    bar.finish_and_clear();

    match result {
        Ok(outcome) => {
            match outcome.status {
                JobStatus::Completed => {
                    println!("{} downloaded ({} chapters).", outcome.book, outcome.total);
                }
                JobStatus::CompletedWithErrors => {
                    println!(
                        "{} partially downloaded: {} of {} chapters failed (retryable): {:?}",
                        outcome.book,
                        outcome.failed_chapters.len(),
                        outcome.total,
                        outcome.failed_chapters
                    );
                    println!("Re-run the download to retry the failed chapters.");
                }
                JobStatus::Cancelled => {
                    println!(
                        "Download of {} cancelled; completed chapters are kept offline.",
                        outcome.book
                    );
                }
                JobStatus::Idle | JobStatus::Running => {}
            }
            controller.acknowledge();
        }
        Err(JobError::Offline) => {
            println!("Could not start download: you appear to be offline.");
        }
        Err(JobError::AlreadyRunning) => {
            println!("A download is already running.");
        }
        Err(JobError::UnknownBook { name }) => {
            println!("Unknown book: {name}");
        }
        Err(e @ JobError::Cache(_)) => return Err(e.into()),
    }

    Ok(())
}

/// Prints a chapter: cached content first, live fetch fallback.
async fn run_read(
    book_name: &str,
    chapter: u32,
    cache: &VerseCache,
    client: &Arc<dyn VerseSource>,
) -> Result<()> {
    let key = match canon::chapter_key(book_name, chapter) {
        Ok(key) => key,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let entry = cache.get(&key).await?;
    let (verses, provisional) = match entry {
        Some(entry) if !entry.provisional => (entry.verses, false),
        _ => {
            debug!(key = %key, "chapter not cached, fetching live");
            let outcome = client.fetch_chapter(&key).await;
            let provisional = !outcome.is_real();
            if provisional {
                warn!(key = %key, "live fetch failed, showing placeholder");
            } else if let Err(e) = cache.put(&key, outcome.verses().to_vec()).await {
                warn!(key = %key, error = %e, "failed to cache chapter");
            }
            (outcome.into_verses(), provisional)
        }
    };

    println!("{key}");
    for verse in &verses {
        println!("{:>3}  {}", verse.verse, verse.text);
    }
    if provisional {
        println!("(content unavailable; showing placeholder text)");
    }
    Ok(())
}

async fn run_search(
    query: &str,
    cache: Arc<VerseCache>,
    client: Arc<dyn VerseSource>,
    monitor: NetworkStatusMonitor,
) -> Result<()> {
    let index = SearchIndex::new(cache, client, monitor);
    let results = index.search(query).await;

    if results.is_empty() {
        println!("No results for \"{query}\".");
        return Ok(());
    }
    for result in &results {
        println!("{}  {}", result.reference, result.text);
    }
    Ok(())
}

async fn run_stats(cache: Arc<VerseCache>) -> Result<()> {
    let stats = OfflineStatsAggregator::new(cache).compute().await?;
    println!("Books downloaded:    {}", stats.books_downloaded);
    println!("Chapters downloaded: {}", stats.chapters_downloaded);
    println!("Storage used:        {} bytes", stats.storage_bytes);
    Ok(())
}

async fn run_books(cache: &VerseCache, downloaded_only: bool) -> Result<()> {
    for book in canon::books() {
        let percent = cache.book_progress_percent(book).await?;
        if downloaded_only && percent < 100 {
            continue;
        }
        let marker = if percent == 100 {
            "[offline]"
        } else if percent > 0 {
            "[partial]"
        } else {
            ""
        };
        println!("{:<20} {:>3} chapters  {:>3}% {}", book.name, book.chapters, percent, marker);
    }
    Ok(())
}

async fn run_clear(cache: &VerseCache, yes: bool) -> Result<()> {
    if !yes {
        print!("Delete all offline data? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }
    let removed = cache.clear_all().await?;
    println!("Removed {removed} cached chapters.");
    Ok(())
}
