//! Show command handler

use std::path::PathBuf;

use anyhow::Result;

use wordblame::report::render_words;
use wordblame::{Config, RevisionId};

use super::{load_revision, open_store};

/// Print the per-word authorship of a revision.
pub fn handle(
    page: &str,
    revision: Option<RevisionId>,
    json: bool,
    store_dir: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(store_dir, &config)?;
    let (revision, words) = load_revision(&store, page, revision)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&words)?);
        return Ok(());
    }

    let moved = words.iter().filter(|w| w.is_moved).count();
    println!(
        "{} @ revision {}: {} word(s), {} moved",
        page,
        revision,
        words.len(),
        moved
    );
    println!();
    print!("{}", render_words(&words));
    Ok(())
}
