//! wordblame CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wordblame::cli::{Cli, Commands, ConfigCommands};

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Annotate {
            files,
            store,
            jobs,
            tie_break,
        } => commands::annotate::handle(&files, store, jobs, tie_break),
        Commands::Show {
            page,
            revision,
            json,
            store,
        } => commands::show::handle(&page, revision, json, store),
        Commands::Stats {
            page,
            revision,
            json,
            store,
        } => commands::stats::handle(&page, revision, json, store),
        Commands::Tokenize { file, units } => commands::tokenize::handle(file.as_deref(), units),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Edit => commands::config::handle_edit(),
            ConfigCommands::Migrate { yes } => commands::config::handle_migrate(yes),
        },
        Commands::Completions { shell } => commands::completions::handle(shell),
    }
}
