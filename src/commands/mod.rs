//! Subcommand handlers

pub mod annotate;
pub mod completions;
pub mod config;
pub mod show;
pub mod stats;
pub mod tokenize;

use std::path::PathBuf;

use anyhow::{Context, Result};

use wordblame::{AnnotationStore, Config, JsonStore, RevisionId, WordAnnotation};

/// Open the store named on the command line, or the configured one.
pub fn open_store(flag: Option<PathBuf>, config: &Config) -> Result<JsonStore> {
    let dir = flag.unwrap_or_else(|| config.store.dir.clone());
    JsonStore::open(&dir).with_context(|| format!("Failed to open store at {}", dir.display()))
}

/// Annotations of `revision`, or of the latest complete revision.
pub fn load_revision(
    store: &dyn AnnotationStore,
    page: &str,
    revision: Option<RevisionId>,
) -> Result<(RevisionId, Vec<WordAnnotation>)> {
    let revision = match revision {
        Some(revision) => revision,
        None => store
            .last_complete(page)?
            .map(|summary| summary.revision_id)
            .with_context(|| format!("No annotated revisions for page {:?}", page))?,
    };
    let words = store
        .annotations(page, revision)
        .with_context(|| format!("Revision {} of {:?} is not annotated", revision, page))?;
    Ok((revision, words))
}
