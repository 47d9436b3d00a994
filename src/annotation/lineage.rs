//! A page's history as a fold over its revisions.
//!
//! The only state carried from one revision to the next is the previous
//! annotation vector, so any prefix of the chain can be replayed from
//! scratch or resumed from a stored head.

use crate::diff::{validate_child, DiffError, DiffProvider};

use super::engine::{propagate, seed, Propagation};
use super::pool::TieBreak;
use super::{RevisionId, RevisionMeta, WordAnnotation};

/// Annotate one revision given its parent's annotations (if any).
///
/// The parent's word sequence is taken from its annotations, so the diff
/// always lines up with the state being propagated.
pub fn advance(
    parent: Option<&[WordAnnotation]>,
    child_words: &[String],
    child: &RevisionMeta,
    diff: &dyn DiffProvider,
    tie_break: TieBreak,
) -> Result<Propagation, DiffError> {
    let Some(parent) = parent else {
        return Ok(seed(child_words, child));
    };

    let parent_words: Vec<String> = parent.iter().map(|a| a.word.clone()).collect();
    let segments = diff.diff(&parent_words, child_words);
    tracing::trace!(
        provider = diff.name(),
        segments = segments.len(),
        "diffed revision"
    );
    validate_child(child_words, &segments)?;
    propagate(parent, &segments, child, tie_break)
}

/// Fold a whole chain of `(meta, words)` pairs, starting from no parent.
///
/// Returns the annotations of the last revision, or the failing revision
/// with its error.
pub fn replay<I>(
    revisions: I,
    diff: &dyn DiffProvider,
    tie_break: TieBreak,
) -> Result<Vec<WordAnnotation>, (RevisionId, DiffError)>
where
    I: IntoIterator<Item = (RevisionMeta, Vec<String>)>,
{
    revisions
        .into_iter()
        .try_fold(None::<Vec<WordAnnotation>>, |head, (meta, words)| {
            advance(head.as_deref(), &words, &meta, diff, tie_break)
                .map(|step| Some(step.annotations))
                .map_err(|e| (meta.revision_id, e))
        })
        .map(Option::unwrap_or_default)
}
