//! In-memory annotation store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{AnnotationStore, PageHead, Recorded, RunId, StoreError};
use crate::annotation::{
    PageId, RevisionAnnotation, RevisionId, RevisionMeta, TransitionStats, WordAnnotation,
};

/// Every pending revision of a memory store belongs to the store itself.
const RUN: RunId = 0;

#[derive(Debug, Default)]
struct PageState {
    head: PageHead,
    records: HashMap<RevisionId, Recorded>,
    words: HashMap<RevisionId, Vec<WordAnnotation>>,
}

/// Keeps everything in a mutex-guarded map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Mutex<HashMap<PageId, PageState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PageId, PageState>> {
        // A panic while holding the lock leaves the map itself intact
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AnnotationStore for MemoryStore {
    fn begin(
        &self,
        meta: &RevisionMeta,
        parent: Option<RevisionId>,
    ) -> Result<RevisionAnnotation, StoreError> {
        let mut pages = self.lock();
        let page = pages.entry(meta.page_id.clone()).or_default();
        let records = &page.records;
        let recorded = page.head.begin(
            meta,
            parent,
            RUN,
            records.get(&meta.revision_id),
            |p| Ok(records.get(&p).is_some_and(|r| r.summary.is_complete())),
        )?;
        let summary = recorded.summary.clone();
        page.records.insert(meta.revision_id, recorded);
        Ok(summary)
    }

    fn complete(
        &self,
        meta: &RevisionMeta,
        annotations: &[WordAnnotation],
        stats: &TransitionStats,
    ) -> Result<RevisionAnnotation, StoreError> {
        let mut pages = self.lock();
        let page = pages
            .get_mut(&meta.page_id)
            .ok_or_else(|| StoreError::NotStarted {
                page: meta.page_id.clone(),
                revision: meta.revision_id,
            })?;
        let current = page.records.get(&meta.revision_id).cloned();
        let recorded = page.head.complete(meta, RUN, current, stats)?;
        let summary = recorded.summary.clone();
        page.records.insert(meta.revision_id, recorded);
        page.words.insert(meta.revision_id, annotations.to_vec());
        Ok(summary)
    }

    fn fail(&self, meta: &RevisionMeta, reason: &str) -> Result<RevisionAnnotation, StoreError> {
        let mut pages = self.lock();
        let page = pages
            .get_mut(&meta.page_id)
            .ok_or_else(|| StoreError::NotStarted {
                page: meta.page_id.clone(),
                revision: meta.revision_id,
            })?;
        let current = page.records.get(&meta.revision_id).cloned();
        let recorded = page.head.fail(meta, RUN, current, reason)?;
        let summary = recorded.summary.clone();
        page.records.insert(meta.revision_id, recorded);
        Ok(summary)
    }

    fn annotations(
        &self,
        page: &str,
        revision: RevisionId,
    ) -> Result<Vec<WordAnnotation>, StoreError> {
        let pages = self.lock();
        pages
            .get(page)
            .and_then(|state| state.words.get(&revision))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                page: page.to_string(),
                revision,
            })
    }

    fn summaries(&self, page: &str) -> Result<Vec<RevisionAnnotation>, StoreError> {
        let pages = self.lock();
        let mut records: Vec<&Recorded> = pages
            .get(page)
            .map(|state| state.records.values().collect())
            .unwrap_or_default();
        records.sort_by_key(|r| r.seq);
        Ok(records.into_iter().map(|r| r.summary.clone()).collect())
    }

    fn summary(
        &self,
        page: &str,
        revision: RevisionId,
    ) -> Result<Option<RevisionAnnotation>, StoreError> {
        let pages = self.lock();
        Ok(pages
            .get(page)
            .and_then(|state| state.records.get(&revision))
            .map(|r| r.summary.clone()))
    }

    fn last_complete(&self, page: &str) -> Result<Option<RevisionAnnotation>, StoreError> {
        let pages = self.lock();
        Ok(pages.get(page).and_then(|state| {
            let head = state.head.last_complete?;
            state.records.get(&head).map(|r| r.summary.clone())
        }))
    }
}
