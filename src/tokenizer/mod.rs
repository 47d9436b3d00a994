//! Markup cleaning and word tokenization.
//!
//! Raw revision text is wiki-style markup. Before authorship can be tracked
//! the markup noise has to go: templates, citation blocks and category
//! declarations carry no prose, links collapse to their visible text and
//! tags are stripped down to their content.
//!
//! The cleaning pipeline is a list of [`MarkupPass`] values applied in order,
//! followed by a split on whitespace. Every pass tolerates malformed input:
//! an unterminated construct is left in the text as-is rather than swallowing
//! whatever follows it.
//!
//! # Module Structure
//!
//! - [`passes`] - Individual cleaning passes

mod passes;

use serde::{Deserialize, Serialize};

pub use passes::{
    ResolveLinks, StripCategories, StripComments, StripReferences, StripTags, StripTemplates,
};

/// A single pass over raw markup text.
///
/// Passes are pure: the same input always produces the same output.
pub trait MarkupPass: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return the cleaned text.
    fn apply(&self, text: &str) -> String;
}

/// A content word surviving markup cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token text
    pub text: String,
    /// 0-based index within the revision's token sequence
    pub position: usize,
}

/// Runs the cleaning passes and splits the result into tokens.
pub struct Tokenizer {
    passes: Vec<Box<dyn MarkupPass>>,
}

impl Tokenizer {
    /// Create a tokenizer with a custom pass list.
    pub fn with_passes(passes: Vec<Box<dyn MarkupPass>>) -> Self {
        Self { passes }
    }

    /// The standard pipeline: templates, links, references, comments, tags,
    /// categories.
    pub fn new() -> Self {
        Self::with_passes(vec![
            Box::new(StripTemplates),
            Box::new(ResolveLinks),
            Box::new(StripReferences),
            Box::new(StripComments),
            Box::new(StripTags),
            Box::new(StripCategories),
        ])
    }

    /// Apply every pass in order.
    pub fn clean(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for pass in &self.passes {
            text = pass.apply(&text);
            tracing::trace!(pass = pass.name(), len = text.len(), "markup pass applied");
        }
        text
    }

    /// Clean `raw` and split it into positioned tokens.
    pub fn tokenize(&self, raw: &str) -> Vec<Token> {
        self.words(raw)
            .into_iter()
            .enumerate()
            .map(|(position, text)| Token { text, position })
            .collect()
    }

    /// Clean `raw` and return the bare word texts.
    pub fn words(&self, raw: &str) -> Vec<String> {
        self.clean(raw)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize with the standard pipeline.
pub fn tokenize(raw: &str) -> Vec<Token> {
    Tokenizer::new().tokenize(raw)
}

/// Word texts from the standard pipeline.
pub fn words(raw: &str) -> Vec<String> {
    Tokenizer::new().words(raw)
}
