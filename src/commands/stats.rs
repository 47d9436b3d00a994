//! Stats command handler

use std::path::PathBuf;

use anyhow::Result;

use wordblame::report::{credits, render_credits};
use wordblame::{Config, RevisionId};

use super::{load_revision, open_store};

/// Print per-author credit for a revision.
pub fn handle(
    page: &str,
    revision: Option<RevisionId>,
    json: bool,
    store_dir: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(store_dir, &config)?;
    let (revision, words) = load_revision(&store, page, revision)?;
    let credits = credits(&words);

    if json {
        println!("{}", serde_json::to_string_pretty(&credits)?);
        return Ok(());
    }

    println!(
        "{} @ revision {}: {} word(s) by {} author(s)",
        page,
        revision,
        words.len(),
        credits.len()
    );
    println!();
    print!("{}", render_credits(&credits));
    Ok(())
}
