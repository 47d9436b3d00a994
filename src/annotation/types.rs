//! Annotation records shared by the engine, the store and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Revision identifier, unique within a page.
pub type RevisionId = u64;

/// Page identifier.
pub type PageId = String;

/// Stable identity of a word instance across revisions.
///
/// Minted by the revision that first typed the word: `index` is the word's
/// ordinal among the words that revision introduced. Minting only depends on
/// the revision and the diff, so re-annotating yields the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OriginId {
    pub revision: RevisionId,
    pub index: u32,
}

impl OriginId {
    pub fn new(revision: RevisionId, index: u32) -> Self {
        Self { revision, index }
    }
}

impl std::fmt::Display for OriginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}.{}", self.revision, self.index)
    }
}

/// Identity of the revision being annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMeta {
    pub page_id: PageId,
    pub revision_id: RevisionId,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RevisionMeta {
    pub fn new(page_id: impl Into<PageId>, revision_id: RevisionId, author: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            revision_id,
            author: author.into(),
            timestamp: None,
        }
    }
}

/// Authorship of one word in one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnnotation {
    /// Word text
    pub word: String,
    /// Dense 0-based index in the revision's word sequence
    pub position: usize,
    /// Contributor who introduced this word instance
    pub author: String,
    /// Identity carried across revisions
    pub origin: OriginId,
    /// Matched a word deleted from the parent rather than being carried or typed
    pub is_moved: bool,
    pub revision_id: RevisionId,
    pub page_id: PageId,
}

/// Lifecycle of a revision's annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Complete,
    Failed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Complete => write!(f, "complete"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// Word counts of a single parent-to-child transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionStats {
    /// Words carried by equal segments
    pub equal: usize,
    /// Inserted words with no match in the deleted pool
    pub added: usize,
    /// Inserted words matched against the deleted pool
    pub moved: usize,
    /// Deleted words left unmatched
    pub removed: usize,
}

impl TransitionStats {
    /// Length of the child sequence.
    pub fn word_count(&self) -> usize {
        self.equal + self.added + self.moved
    }
}

/// Per-revision summary kept by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionAnnotation {
    pub page_id: PageId,
    pub revision_id: RevisionId,
    pub parent_id: Option<RevisionId>,
    pub author: String,
    pub status: Status,
    pub word_count: usize,
    pub moved_count: usize,
    pub added_count: usize,
    pub removed_count: usize,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RevisionAnnotation {
    /// A freshly started annotation.
    pub fn pending(meta: &RevisionMeta, parent_id: Option<RevisionId>) -> Self {
        Self {
            page_id: meta.page_id.clone(),
            revision_id: meta.revision_id,
            parent_id,
            author: meta.author.clone(),
            status: Status::Pending,
            word_count: 0,
            moved_count: 0,
            added_count: 0,
            removed_count: 0,
            started_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    pub fn mark_complete(&mut self, stats: &TransitionStats) {
        self.status = Status::Complete;
        self.word_count = stats.word_count();
        self.moved_count = stats.moved;
        self.added_count = stats.added;
        self.removed_count = stats.removed;
        self.completed_at = Some(Utc::now());
        self.error = None;
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = Status::Failed;
        self.completed_at = Some(Utc::now());
        self.error = Some(reason.into());
    }

    pub fn is_complete(&self) -> bool {
        self.status == Status::Complete
    }
}
