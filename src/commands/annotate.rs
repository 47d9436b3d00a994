//! Annotate command handler

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use wordblame::driver::PageOutcome;
use wordblame::{Config, PageAnnotator, TieBreak};

use super::open_store;

/// Annotate each history file and report per-page results.
///
/// Exits with an error if any page failed.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    files: &[PathBuf],
    store_dir: Option<PathBuf>,
    jobs: Option<usize>,
    tie_break: Option<TieBreak>,
) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(store_dir, &config)?;

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        eprintln!("Stopping after the revision in progress...");
        flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    let annotator = PageAnnotator::new(&store)
        .with_tie_break(tie_break.unwrap_or(config.engine.tie_break))
        .with_split_punctuation(config.engine.split_punctuation)
        .with_stop_flag(stop);

    let outcomes = annotator.annotate_files(files, jobs.unwrap_or(config.driver.jobs))?;

    let mut failed = 0;
    for outcome in &outcomes {
        match report(outcome) {
            Ok(line) => println!("{}", line),
            Err(line) => {
                eprintln!("{}", line);
                failed += 1;
            }
        }
    }

    println!("Annotations stored in {}", store.root().display());

    if failed > 0 {
        bail!("{} of {} page(s) failed", failed, outcomes.len());
    }
    Ok(())
}

/// One line per page: the run's counts, or the failure.
fn report(outcome: &PageOutcome) -> std::result::Result<String, String> {
    match &outcome.result {
        Ok(summary) => {
            let resumed = summary
                .resumed_from
                .map(|id| format!(", resumed after revision {}", id))
                .unwrap_or_default();
            Ok(format!(
                "{}: {} revision(s), {} word(s), {} move(s) in {:.2}s{}",
                summary.title,
                summary.revisions_processed,
                summary.words_processed,
                summary.moves_detected,
                summary.elapsed.as_secs_f64(),
                resumed,
            ))
        }
        Err(err) => Err(format!("{}: {}", outcome.source.display(), err)),
    }
}
