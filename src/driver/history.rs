//! Page revision histories read from JSON files.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DriverError;
use crate::annotation::{PageId, RevisionId, RevisionMeta};

/// One stored revision of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: RevisionId,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    /// Raw markup text
    pub text: String,
}

/// A page and its revisions in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageHistory {
    pub page_id: PageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub revisions: Vec<Revision>,
}

impl PageHistory {
    /// Load a history from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DriverError> {
        let content = fs::read_to_string(path).map_err(|source| DriverError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| DriverError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Title for display, falling back to the page id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.page_id)
    }

    /// Reject histories whose timestamps go backwards.
    ///
    /// Equal timestamps are allowed; the file order breaks the tie.
    pub fn check_order(&self) -> Result<(), DriverError> {
        for pair in self.revisions.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(DriverError::OutOfOrder {
                    page: self.page_id.clone(),
                    revision: pair[1].id,
                    previous: pair[0].id,
                });
            }
        }
        Ok(())
    }

    /// Index of `revision` in the history.
    pub fn position_of(&self, revision: RevisionId) -> Option<usize> {
        self.revisions.iter().position(|r| r.id == revision)
    }
}

impl Revision {
    /// Engine-facing identity of this revision on `page`.
    pub fn meta(&self, page: &str) -> RevisionMeta {
        RevisionMeta {
            page_id: page.to_string(),
            revision_id: self.id,
            author: self.author.clone(),
            timestamp: Some(self.timestamp),
        }
    }
}
