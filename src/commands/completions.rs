//! Completions command handler

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

use wordblame::cli::Cli;

/// Write a completion script for `shell` to stdout.
pub fn handle(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "wordblame", &mut std::io::stdout());
    Ok(())
}
