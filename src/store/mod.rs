//! Persistence of revision annotations.
//!
//! The store keeps, per page, one [`RevisionAnnotation`] summary per
//! revision plus the word annotations of every completed revision. It is
//! also where the chain's ordering rules are enforced: a revision can only
//! start once its parent is complete and is the page's latest complete
//! revision, and at most one revision per page may be pending.
//!
//! The rules only ever look at a small per-page [`PageHead`] and at the
//! summaries of the revisions involved, so each operation costs the same
//! however long the page's history is.
//!
//! # Module Structure
//!
//! - [`memory`] - In-process store, used by tests and one-shot runs
//! - [`json`] - One directory per page of JSON files

mod json;
mod memory;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::annotation::{
    RevisionAnnotation, RevisionId, RevisionMeta, Status, TransitionStats, WordAnnotation,
};

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Errors raised by annotation stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("revision {revision} of {page:?} needs parent {parent}, which has no complete annotation")]
    MissingParent {
        page: String,
        revision: RevisionId,
        parent: RevisionId,
    },

    #[error("revision {revision} of {page:?} must follow {head:?}, the latest complete revision")]
    StaleParent {
        page: String,
        revision: RevisionId,
        head: Option<RevisionId>,
    },

    #[error("revision {revision} of {page:?} is already complete")]
    AlreadyComplete { page: String, revision: RevisionId },

    #[error("revision {pending} of {page:?} is still being annotated")]
    InFlight { page: String, pending: RevisionId },

    #[error("revision {revision} of {page:?} was never started")]
    NotStarted { page: String, revision: RevisionId },

    #[error("no complete annotation for revision {revision} of {page:?}")]
    NotFound { page: String, revision: RevisionId },

    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store file {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and writes per-revision annotations.
///
/// Implementations must be safe to share between threads annotating
/// different pages.
pub trait AnnotationStore: Send + Sync {
    /// Mark `meta` as pending.
    ///
    /// `parent` must be the page's latest complete revision (`None` for the
    /// first revision of a page). A failed summary for the same revision is
    /// replaced. A pending one is replaced only when it was left behind by an
    /// earlier store instance, which is taken to mean its run is dead.
    fn begin(
        &self,
        meta: &RevisionMeta,
        parent: Option<RevisionId>,
    ) -> Result<RevisionAnnotation, StoreError>;

    /// Store the words of a pending revision and mark it complete.
    fn complete(
        &self,
        meta: &RevisionMeta,
        annotations: &[WordAnnotation],
        stats: &TransitionStats,
    ) -> Result<RevisionAnnotation, StoreError>;

    /// Mark a pending revision as failed.
    fn fail(&self, meta: &RevisionMeta, reason: &str) -> Result<RevisionAnnotation, StoreError>;

    /// Words of a complete revision.
    fn annotations(&self, page: &str, revision: RevisionId)
        -> Result<Vec<WordAnnotation>, StoreError>;

    /// All summaries of a page, in the order their annotation started.
    fn summaries(&self, page: &str) -> Result<Vec<RevisionAnnotation>, StoreError>;

    /// Summary of one revision.
    fn summary(
        &self,
        page: &str,
        revision: RevisionId,
    ) -> Result<Option<RevisionAnnotation>, StoreError> {
        Ok(self
            .summaries(page)?
            .into_iter()
            .find(|s| s.revision_id == revision))
    }

    /// The page's most recently completed revision.
    fn last_complete(&self, page: &str) -> Result<Option<RevisionAnnotation>, StoreError> {
        Ok(self
            .summaries(page)?
            .into_iter()
            .rev()
            .find(RevisionAnnotation::is_complete))
    }
}

/// Identifies the store instance that claimed a pending revision.
pub(crate) type RunId = u64;

/// A pending revision and the run working on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Claim {
    pub revision: RevisionId,
    pub run: RunId,
}

/// A summary as kept by a store, with its position in start order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Recorded {
    pub seq: u64,
    pub summary: RevisionAnnotation,
}

/// Everything the chain rules need to know about a page besides the
/// summaries of the revisions at hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PageHead {
    pub last_complete: Option<RevisionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<Claim>,
    /// Number of summaries recorded; the next new one gets this as `seq`.
    #[serde(default)]
    pub recorded: u64,
}

impl PageHead {
    /// Start `meta` on top of `parent` for `run`.
    ///
    /// `current` is the stored summary of the same revision, if any.
    /// `parent_is_complete` is only asked about a parent that is not the head.
    pub fn begin(
        &mut self,
        meta: &RevisionMeta,
        parent: Option<RevisionId>,
        run: RunId,
        current: Option<&Recorded>,
        parent_is_complete: impl FnOnce(RevisionId) -> Result<bool, StoreError>,
    ) -> Result<Recorded, StoreError> {
        let page = &meta.page_id;
        let revision = meta.revision_id;

        if current.is_some_and(|r| r.summary.is_complete()) {
            return Err(StoreError::AlreadyComplete {
                page: page.clone(),
                revision,
            });
        }
        if let Some(claim) = self.pending {
            if claim.revision != revision || claim.run == run {
                return Err(StoreError::InFlight {
                    page: page.clone(),
                    pending: claim.revision,
                });
            }
            tracing::debug!(
                revision,
                run = claim.run,
                "reclaiming revision from an earlier run"
            );
        }
        if let Some(parent) = parent {
            if self.last_complete != Some(parent) && !parent_is_complete(parent)? {
                return Err(StoreError::MissingParent {
                    page: page.clone(),
                    revision,
                    parent,
                });
            }
        }
        if self.last_complete != parent {
            return Err(StoreError::StaleParent {
                page: page.clone(),
                revision,
                head: self.last_complete,
            });
        }

        let seq = match current {
            Some(existing) => existing.seq,
            None => {
                self.recorded += 1;
                self.recorded - 1
            }
        };
        self.pending = Some(Claim { revision, run });
        Ok(Recorded {
            seq,
            summary: RevisionAnnotation::pending(meta, parent),
        })
    }

    /// Check that `run` holds the claim on `meta`, without changing anything.
    pub fn check_claim(
        &self,
        meta: &RevisionMeta,
        run: RunId,
        current: Option<&Recorded>,
    ) -> Result<(), StoreError> {
        let page = meta.page_id.clone();
        let revision = meta.revision_id;
        if current.is_some_and(|r| r.summary.is_complete()) {
            return Err(StoreError::AlreadyComplete { page, revision });
        }
        match (self.pending, current) {
            (Some(claim), Some(_)) if claim == (Claim { revision, run }) => Ok(()),
            _ => Err(StoreError::NotStarted { page, revision }),
        }
    }

    pub fn complete(
        &mut self,
        meta: &RevisionMeta,
        run: RunId,
        current: Option<Recorded>,
        stats: &TransitionStats,
    ) -> Result<Recorded, StoreError> {
        self.check_claim(meta, run, current.as_ref())?;
        let mut recorded = current.ok_or_else(|| StoreError::NotStarted {
            page: meta.page_id.clone(),
            revision: meta.revision_id,
        })?;
        recorded.summary.mark_complete(stats);
        self.last_complete = Some(meta.revision_id);
        self.pending = None;
        Ok(recorded)
    }

    pub fn fail(
        &mut self,
        meta: &RevisionMeta,
        run: RunId,
        current: Option<Recorded>,
        reason: &str,
    ) -> Result<Recorded, StoreError> {
        self.check_claim(meta, run, current.as_ref())?;
        let mut recorded = current.ok_or_else(|| StoreError::NotStarted {
            page: meta.page_id.clone(),
            revision: meta.revision_id,
        })?;
        recorded.summary.mark_failed(reason);
        self.pending = None;
        Ok(recorded)
    }

    /// Bring the head in line with the pending summary after an interrupted
    /// write: the summary is written first, so it is the one to trust.
    pub fn reconcile(&mut self, pending: Option<&Recorded>) {
        let Some(claim) = self.pending else {
            return;
        };
        match pending.map(|r| r.summary.status) {
            Some(Status::Pending) => {}
            Some(Status::Complete) => {
                self.last_complete = Some(claim.revision);
                self.pending = None;
            }
            Some(Status::Failed) | None => self.pending = None,
        }
    }
}
