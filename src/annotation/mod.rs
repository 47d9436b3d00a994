//! Word-level authorship annotation.
//!
//! Each revision of a page gets one [`WordAnnotation`] per word, recording
//! who introduced the word and whether it was relocated rather than typed.
//! A revision's annotations derive from exactly one parent: the previous
//! revision's annotations plus the diff between the two word sequences.
//!
//! # Module Structure
//!
//! - [`types`] - Annotation records and per-revision summaries
//! - [`engine`] - Propagation from parent to child, with move detection
//! - [`pool`] - The deleted pool and its tie-break policy
//! - [`lineage`] - Folding a revision chain through the engine

mod engine;
mod lineage;
mod pool;
mod types;

pub use engine::{propagate, seed, Propagation};
pub use lineage::{advance, replay};
pub use pool::TieBreak;
pub use types::{
    OriginId, PageId, RevisionAnnotation, RevisionId, RevisionMeta, Status, TransitionStats,
    WordAnnotation,
};
