//! wordblame - word-level authorship tracking for revision histories
//!
//! Given the revisions of a collaboratively edited page, works out which
//! contributor is responsible for every word of every revision, including
//! words that were moved around rather than retyped.
//!
//! # Module Structure
//!
//! - [`tokenizer`] - Markup cleaning and word splitting
//! - [`diff`] - Word diff segments, the provider trait and the bundled LCS diff
//! - [`annotation`] - Propagation engine with move detection
//! - [`store`] - Per-revision persistence (in memory or JSON on disk)
//! - [`driver`] - Annotating whole page histories, resumable and in parallel
//! - [`report`] - Text views of annotations and per-author credit
//! - [`config`] - User configuration
//! - [`cli`] - Command-line definition, shared with the man page generator

pub mod annotation;
pub mod cli;
pub mod config;
pub mod diff;
pub mod driver;
pub mod report;
pub mod store;
pub mod tokenizer;

pub use annotation::{
    advance, propagate, replay, seed, OriginId, Propagation, RevisionAnnotation, RevisionId,
    RevisionMeta, Status, TieBreak, TransitionStats, WordAnnotation,
};
pub use config::Config;
pub use diff::{DiffError, DiffProvider, Segment, SegmentKind, WordDiff};
pub use driver::{DriverError, PageAnnotator, PageHistory, RunSummary};
pub use store::{AnnotationStore, JsonStore, MemoryStore, StoreError};
pub use tokenizer::{tokenize, words, Token, Tokenizer};

/// Version string with build metadata.
#[cfg(not(feature = "release"))]
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

/// Version string with build metadata.
#[cfg(feature = "release")]
pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);
