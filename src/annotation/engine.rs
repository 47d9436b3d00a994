//! Propagation of word annotations from a parent revision to its child.
//!
//! **Algorithm**:
//! 1. Validate that the diff's parent side reproduces the parent words
//! 2. Walk the segments once, collecting every `delete` word into the
//!    deleted pool (in parent order)
//! 3. Walk them again, emitting the child sequence:
//!    - `equal` words keep the parent's author and origin, `is_moved = false`
//!    - `insert` words take the author and origin of a pool match
//!      (`is_moved = true`), or mint a new origin for the child's author
//!    - `delete` words emit nothing
//!
//! Collecting the pool up front means a word moved towards the start of the
//! document is recognised even though its `delete` comes after its `insert`.

use crate::diff::{validate_parent, DiffError, Segment, SegmentKind};

use super::pool::{DeletedPool, TieBreak};
use super::{OriginId, RevisionMeta, TransitionStats, WordAnnotation};

/// Result of annotating one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Propagation {
    pub annotations: Vec<WordAnnotation>,
    pub stats: TransitionStats,
}

/// Annotate the first revision of a page: every word is new.
pub fn seed(words: &[String], meta: &RevisionMeta) -> Propagation {
    let mut minter = OriginMinter::new(meta);
    let annotations: Vec<_> = words
        .iter()
        .enumerate()
        .map(|(position, word)| minter.fresh(word, position))
        .collect();

    Propagation {
        stats: TransitionStats {
            added: annotations.len(),
            ..TransitionStats::default()
        },
        annotations,
    }
}

/// Derive the child's annotations from its parent's and the diff between
/// them.
///
/// Fails only when `segments` do not cover `parent` exactly; no partial
/// result is produced in that case.
pub fn propagate(
    parent: &[WordAnnotation],
    segments: &[Segment],
    child: &RevisionMeta,
    tie_break: TieBreak,
) -> Result<Propagation, DiffError> {
    let parent_words: Vec<&str> = parent.iter().map(|a| a.word.as_str()).collect();
    validate_parent(&parent_words, segments)?;

    let mut pool = DeletedPool::default();
    let mut cursor = 0;
    for segment in segments {
        if segment.kind == SegmentKind::Delete {
            for (offset, annotation) in parent[cursor..cursor + segment.len()].iter().enumerate() {
                pool.push(cursor + offset, annotation);
            }
        }
        if segment.kind.consumes_parent() {
            cursor += segment.len();
        }
    }

    let child_len: usize = segments
        .iter()
        .filter(|s| s.kind.produces_child())
        .map(Segment::len)
        .sum();
    let mut annotations = Vec::with_capacity(child_len);
    let mut stats = TransitionStats::default();
    let mut minter = OriginMinter::new(child);

    cursor = 0;
    for segment in segments {
        match segment.kind {
            SegmentKind::Equal => {
                for source in &parent[cursor..cursor + segment.len()] {
                    annotations.push(carry(source, annotations.len(), child, false));
                }
                stats.equal += segment.len();
                cursor += segment.len();
            }
            SegmentKind::Delete => cursor += segment.len(),
            SegmentKind::Insert => {
                for word in &segment.words {
                    let position = annotations.len();
                    match pool.take(word, cursor, tie_break) {
                        Some(source) => {
                            annotations.push(carry(source, position, child, true));
                            stats.moved += 1;
                        }
                        None => {
                            annotations.push(minter.fresh(word, position));
                            stats.added += 1;
                        }
                    }
                }
            }
        }
    }
    stats.removed = pool.remaining();

    tracing::debug!(
        page = %child.page_id,
        revision = child.revision_id,
        equal = stats.equal,
        added = stats.added,
        moved = stats.moved,
        removed = stats.removed,
        "propagated annotations"
    );

    Ok(Propagation { annotations, stats })
}

/// Re-home a parent annotation at `position` in the child.
fn carry(source: &WordAnnotation, position: usize, child: &RevisionMeta, is_moved: bool) -> WordAnnotation {
    WordAnnotation {
        word: source.word.clone(),
        position,
        author: source.author.clone(),
        origin: source.origin,
        is_moved,
        revision_id: child.revision_id,
        page_id: child.page_id.clone(),
    }
}

/// Hands out origin ids for the words a revision introduces.
struct OriginMinter<'m> {
    meta: &'m RevisionMeta,
    next: u32,
}

impl<'m> OriginMinter<'m> {
    fn new(meta: &'m RevisionMeta) -> Self {
        Self { meta, next: 0 }
    }

    fn fresh(&mut self, word: &str, position: usize) -> WordAnnotation {
        let origin = OriginId::new(self.meta.revision_id, self.next);
        self.next += 1;
        WordAnnotation {
            word: word.to_string(),
            position,
            author: self.meta.author.clone(),
            origin,
            is_moved: false,
            revision_id: self.meta.revision_id,
            page_id: self.meta.page_id.clone(),
        }
    }
}
