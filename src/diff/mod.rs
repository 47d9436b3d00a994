//! Word-level diff segments and the provider seam.
//!
//! A diff between two word sequences is an ordered list of [`Segment`]s.
//! `Equal` and `Delete` segments consume words from the parent side,
//! `Equal` and `Insert` segments produce words on the child side. Together
//! they must cover both sequences exactly; [`validate_parent`] and
//! [`validate_child`] check that contract for providers the engine does not
//! control.

mod lcs;
mod units;

use serde::{Deserialize, Serialize};

pub use lcs::WordDiff;
pub use units::units;

/// Operation tag of a diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Words present in both sequences, consumed in lockstep
    Equal,
    /// Words present only in the child
    Insert,
    /// Words present only in the parent
    Delete,
}

impl SegmentKind {
    /// Whether segments of this kind consume parent words.
    pub fn consumes_parent(self) -> bool {
        matches!(self, SegmentKind::Equal | SegmentKind::Delete)
    }

    /// Whether segments of this kind produce child words.
    pub fn produces_child(self) -> bool {
        matches!(self, SegmentKind::Equal | SegmentKind::Insert)
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Equal => write!(f, "equal"),
            SegmentKind::Insert => write!(f, "insert"),
            SegmentKind::Delete => write!(f, "delete"),
        }
    }
}

/// A run of words sharing one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub words: Vec<String>,
}

impl Segment {
    pub fn new<I, S>(kind: SegmentKind, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn equal<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SegmentKind::Equal, words)
    }

    pub fn insert<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SegmentKind::Insert, words)
    }

    pub fn delete<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SegmentKind::Delete, words)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Computes the segments turning one word sequence into another.
///
/// Implementations must cover both inputs fully, in order, with no gaps or
/// overlaps. Word identity is exact text equality.
pub trait DiffProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    fn diff(&self, parent: &[String], child: &[String]) -> Vec<Segment>;
}

/// A diff that breaks the provider contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("segment {segment} is empty")]
    EmptySegment { segment: usize },

    #[error("segment {segment} consumes past the end of the parent ({parent_len} words)")]
    ParentOverrun { segment: usize, parent_len: usize },

    #[error("segments cover {covered} of {parent_len} parent words")]
    ParentUnderrun { covered: usize, parent_len: usize },

    #[error("parent word {position} is {expected:?} but the diff has {found:?}")]
    ParentMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("segments produce {found} child words, expected {expected}")]
    ChildLength { expected: usize, found: usize },

    #[error("child word {position} is {expected:?} but the diff has {found:?}")]
    ChildMismatch {
        position: usize,
        expected: String,
        found: String,
    },
}

/// Check that the parent side of `segments` reproduces `parent` exactly.
pub fn validate_parent<S: AsRef<str>>(parent: &[S], segments: &[Segment]) -> Result<(), DiffError> {
    let mut cursor = 0;

    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(DiffError::EmptySegment { segment: index });
        }
        if !segment.kind.consumes_parent() {
            continue;
        }
        if cursor + segment.len() > parent.len() {
            return Err(DiffError::ParentOverrun {
                segment: index,
                parent_len: parent.len(),
            });
        }
        for word in &segment.words {
            let expected = parent[cursor].as_ref();
            if expected != word.as_str() {
                return Err(DiffError::ParentMismatch {
                    position: cursor,
                    expected: expected.to_string(),
                    found: word.clone(),
                });
            }
            cursor += 1;
        }
    }

    if cursor != parent.len() {
        return Err(DiffError::ParentUnderrun {
            covered: cursor,
            parent_len: parent.len(),
        });
    }
    Ok(())
}

/// Check that the child side of `segments` reproduces `child` exactly.
pub fn validate_child<S: AsRef<str>>(child: &[S], segments: &[Segment]) -> Result<(), DiffError> {
    let produced: usize = segments
        .iter()
        .filter(|s| s.kind.produces_child())
        .map(Segment::len)
        .sum();
    if produced != child.len() {
        return Err(DiffError::ChildLength {
            expected: child.len(),
            found: produced,
        });
    }

    let words = segments
        .iter()
        .filter(|s| s.kind.produces_child())
        .flat_map(|s| s.words.iter());
    for (position, (expected, found)) in child.iter().zip(words).enumerate() {
        if expected.as_ref() != found.as_str() {
            return Err(DiffError::ChildMismatch {
                position,
                expected: expected.as_ref().to_string(),
                found: found.clone(),
            });
        }
    }
    Ok(())
}
