//! The deleted pool: parent words removed in one transition.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::WordAnnotation;

/// How an inserted word picks among several deleted words with its text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Earliest deleted word in parent order
    #[default]
    First,
    /// Deleted word whose parent position is closest to the insertion point
    Nearest,
}

impl std::fmt::Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreak::First => write!(f, "first"),
            TieBreak::Nearest => write!(f, "nearest"),
        }
    }
}

/// Deleted parent annotations, ordered by parent position and indexed by
/// word text.
#[derive(Debug, Default)]
pub(crate) struct DeletedPool<'a> {
    /// Unconsumed (parent position, annotation) pairs per word, ascending
    by_word: HashMap<&'a str, VecDeque<(usize, &'a WordAnnotation)>>,
    remaining: usize,
}

impl<'a> DeletedPool<'a> {
    /// Add a deleted annotation. Callers push in parent order.
    pub fn push(&mut self, parent_position: usize, annotation: &'a WordAnnotation) {
        self.by_word
            .entry(annotation.word.as_str())
            .or_default()
            .push_back((parent_position, annotation));
        self.remaining += 1;
    }

    /// Consume the entry matching `word`, if any.
    ///
    /// `cursor` is the parent position of the insertion point, used by
    /// [`TieBreak::Nearest`].
    pub fn take(&mut self, word: &str, cursor: usize, tie_break: TieBreak) -> Option<&'a WordAnnotation> {
        let candidates = self.by_word.get_mut(word)?;
        let index = match tie_break {
            TieBreak::First => 0,
            TieBreak::Nearest => candidates
                .iter()
                .enumerate()
                .min_by_key(|(_, (position, _))| position.abs_diff(cursor))
                .map(|(index, _)| index)?,
        };
        let (_, annotation) = candidates.remove(index)?;
        self.remaining -= 1;
        Some(annotation)
    }

    /// Entries never matched.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}
