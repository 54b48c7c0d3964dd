//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Download Bible books for offline reading.
///
/// Biblesync keeps a local chapter-level verse cache so scripture stays
/// readable and searchable without a network connection.
#[derive(Parser, Debug)]
#[command(name = "biblesync")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the offline cache database
    #[arg(long, global = true, default_value = "biblesync.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a book for offline reading
    Download {
        /// Book name ("John", "1 Corinthians", "ps")
        book: String,
    },
    /// Read a chapter (cached content first, live fetch fallback)
    Read {
        /// Book name
        book: String,
        /// Chapter number
        chapter: u32,
    },
    /// Search verses by reference or keyword
    Search {
        /// Free-text query ("peace", "John 3:16")
        query: String,
    },
    /// Show offline storage statistics
    Stats,
    /// List books and their download state
    Books {
        /// Only list fully downloaded books
        #[arg(long)]
        downloaded: bool,
    },
    /// Delete all offline data
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
