//! Command-line definition.
//!
//! Lives in the library so the man page generator can render it.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::annotation::{RevisionId, TieBreak};

#[derive(Debug, Parser)]
#[command(name = "wordblame", version = crate::VERSION)]
#[command(about = "Word-level authorship tracking across page revisions")]
#[command(long_about = "Tracks which contributor is responsible for every word of a \
collaboratively edited page, across its whole revision history. Words moved to a new \
place keep their original author.")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Annotate page histories into the store
    #[command(long_about = "Annotate page histories into the store.\n\n\
Each FILE is a JSON page history. Revisions already complete in the store are \
skipped, so an interrupted run picks up where it stopped. Pages are annotated \
in parallel; a page that fails stops at its last good revision without \
affecting the others.")]
    Annotate {
        /// Page history JSON files
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Store directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        /// Pages annotated in parallel (0 = one per CPU)
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,

        /// How a moved word is matched when several deleted words share its text
        #[arg(long, value_enum)]
        tie_break: Option<TieBreak>,
    },

    /// Show per-word authorship of a revision
    Show {
        /// Page id
        page: String,

        /// Revision to show (defaults to the latest complete one)
        #[arg(short, long, value_name = "ID")]
        revision: Option<RevisionId>,

        /// Print annotations as JSON
        #[arg(long)]
        json: bool,

        /// Store directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },

    /// Show per-author credit for a revision
    Stats {
        /// Page id
        page: String,

        /// Revision to summarize (defaults to the latest complete one)
        #[arg(short, long, value_name = "ID")]
        revision: Option<RevisionId>,

        /// Print credits as JSON
        #[arg(long)]
        json: bool,

        /// Store directory (defaults to the configured one)
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },

    /// Print the words of a markup text, one per line
    Tokenize {
        /// Markup file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Print diff units instead of tokens
        #[arg(long)]
        units: bool,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Open configuration in $EDITOR
    Edit,
    /// Add missing fields with their defaults
    Migrate {
        /// Apply without asking
        #[arg(short, long)]
        yes: bool,
    },
}
