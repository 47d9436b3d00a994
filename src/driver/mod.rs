//! Bulk annotation of page histories.
//!
//! A [`PageAnnotator`] walks one page's revisions in chronological order,
//! feeding each through the tokenizer, the diff provider and the engine and
//! writing the result to the store. Runs are resumable: annotation restarts
//! after the store's last complete revision. Independent pages can be
//! annotated in parallel with [`PageAnnotator::annotate_files`].
//!
//! # Module Structure
//!
//! - [`history`] - Page histories read from JSON

mod history;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::annotation::{advance, PageId, RevisionId, TieBreak, WordAnnotation};
use crate::diff::{units, DiffError, DiffProvider, WordDiff};
use crate::store::{AnnotationStore, StoreError};
use crate::tokenizer::Tokenizer;

pub use history::{PageHistory, Revision};

/// Errors raised while annotating a page.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to read history {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed history {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("revision {revision} of {page:?} is older than the preceding revision {previous}")]
    OutOfOrder {
        page: PageId,
        revision: RevisionId,
        previous: RevisionId,
    },

    #[error("store has {page:?} annotated up to revision {revision}, which is not in the history")]
    UnknownResumePoint { page: PageId, revision: RevisionId },

    #[error("revision {revision} of {page:?} failed: {source}")]
    Revision {
        page: PageId,
        revision: RevisionId,
        #[source]
        source: DiffError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("interrupted after {completed} revision(s) of {page:?}")]
    Interrupted { page: PageId, completed: usize },

    #[error("failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Counts for one page's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub page_id: PageId,
    /// Page title, or the page id when the history has none
    pub title: String,
    /// Revisions annotated by this run
    pub revisions_processed: usize,
    /// Total words across the revisions annotated by this run
    pub words_processed: usize,
    pub moves_detected: usize,
    pub elapsed: Duration,
    /// Last complete revision found in the store before the run started
    pub resumed_from: Option<RevisionId>,
}

impl RunSummary {
    fn new(history: &PageHistory, resumed_from: Option<RevisionId>) -> Self {
        Self {
            page_id: history.page_id.clone(),
            title: history.display_title().to_string(),
            revisions_processed: 0,
            words_processed: 0,
            moves_detected: 0,
            elapsed: Duration::ZERO,
            resumed_from,
        }
    }
}

/// Outcome of annotating one history file.
#[derive(Debug)]
pub struct PageOutcome {
    pub source: PathBuf,
    pub result: Result<RunSummary, DriverError>,
}

/// Annotates page histories into a store.
pub struct PageAnnotator<'a> {
    store: &'a dyn AnnotationStore,
    diff: Box<dyn DiffProvider>,
    tokenizer: Tokenizer,
    tie_break: TieBreak,
    split_punctuation: bool,
    stop: Arc<AtomicBool>,
}

impl<'a> PageAnnotator<'a> {
    /// Annotator with the bundled word diff and default tokenizer.
    pub fn new(store: &'a dyn AnnotationStore) -> Self {
        Self {
            store,
            diff: Box::new(WordDiff::new()),
            tokenizer: Tokenizer::new(),
            tie_break: TieBreak::default(),
            split_punctuation: true,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_diff(mut self, diff: Box<dyn DiffProvider>) -> Self {
        self.diff = diff;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_split_punctuation(mut self, split_punctuation: bool) -> Self {
        self.split_punctuation = split_punctuation;
        self
    }

    /// Share a stop flag; once set, runs stop before the next revision.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Diff units of a revision's raw text.
    pub fn revision_units(&self, text: &str) -> Vec<String> {
        units(&self.tokenizer.words(text), self.split_punctuation)
    }

    /// Annotate every revision of `history` not yet complete in the store.
    pub fn annotate(&self, history: &PageHistory) -> Result<RunSummary, DriverError> {
        let page = history.page_id.as_str();
        let span = tracing::info_span!("page", page);
        let _enter = span.enter();
        let started = Instant::now();

        history.check_order()?;

        let head = self.store.last_complete(page)?;
        let resumed_from = head.as_ref().map(|s| s.revision_id);
        let (start, mut parent) = match resumed_from {
            None => (0, None),
            Some(revision) => {
                let index = history.position_of(revision).ok_or_else(|| {
                    DriverError::UnknownResumePoint {
                        page: page.to_string(),
                        revision,
                    }
                })?;
                let words = self.store.annotations(page, revision)?;
                tracing::info!(revision, words = words.len(), "resuming");
                (index + 1, Some((revision, words)))
            }
        };

        let mut summary = RunSummary::new(history, resumed_from);
        for revision in &history.revisions[start..] {
            if self.stop.load(Ordering::SeqCst) {
                tracing::warn!(completed = summary.revisions_processed, "interrupted");
                return Err(DriverError::Interrupted {
                    page: page.to_string(),
                    completed: summary.revisions_processed,
                });
            }

            let annotations = self.annotate_revision(page, revision, parent.as_ref())?;
            summary.revisions_processed += 1;
            summary.words_processed += annotations.len();
            summary.moves_detected += annotations.iter().filter(|a| a.is_moved).count();
            parent = Some((revision.id, annotations));
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            revisions = summary.revisions_processed,
            words = summary.words_processed,
            moves = summary.moves_detected,
            "page annotated"
        );
        Ok(summary)
    }

    fn annotate_revision(
        &self,
        page: &str,
        revision: &Revision,
        parent: Option<&(RevisionId, Vec<WordAnnotation>)>,
    ) -> Result<Vec<WordAnnotation>, DriverError> {
        let span = tracing::debug_span!("revision", id = revision.id);
        let _enter = span.enter();

        let meta = revision.meta(page);
        let words = self.revision_units(&revision.text);
        self.store.begin(&meta, parent.map(|(id, _)| *id))?;

        let parent_words = parent.map(|(_, words)| words.as_slice());
        match advance(parent_words, &words, &meta, self.diff.as_ref(), self.tie_break) {
            Ok(step) => {
                self.store.complete(&meta, &step.annotations, &step.stats)?;
                tracing::debug!(
                    equal = step.stats.equal,
                    added = step.stats.added,
                    moved = step.stats.moved,
                    removed = step.stats.removed,
                    "revision annotated"
                );
                Ok(step.annotations)
            }
            Err(source) => {
                tracing::warn!(error = %source, "revision failed");
                self.store.fail(&meta, &source.to_string())?;
                Err(DriverError::Revision {
                    page: page.to_string(),
                    revision: revision.id,
                    source,
                })
            }
        }
    }

    /// Load and annotate each history file, `jobs` pages at a time.
    ///
    /// `jobs == 0` uses one thread per CPU. Outcomes are returned in the
    /// order of `paths`; a failing page does not stop the others.
    pub fn annotate_files(
        &self,
        paths: &[PathBuf],
        jobs: usize,
    ) -> Result<Vec<PageOutcome>, DriverError> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        Ok(pool.install(|| {
            paths
                .par_iter()
                .map(|path| PageOutcome {
                    source: path.clone(),
                    result: self.annotate_file(path),
                })
                .collect()
        }))
    }

    fn annotate_file(&self, path: &Path) -> Result<RunSummary, DriverError> {
        let history = PageHistory::load(path)?;
        self.annotate(&history)
    }
}
