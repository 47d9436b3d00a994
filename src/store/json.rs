//! JSON-on-disk annotation store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<page-dir>/head.json                latest complete and pending revision
//! <root>/<page-dir>/<revision>.summary.json  summary of one revision
//! <root>/<page-dir>/<revision>.json          word annotations of a complete revision
//! ```
//!
//! `<page-dir>` is a filesystem-safe rendering of the page id followed by a
//! hash of the raw id, so ids that sanitize alike stay apart. Files are
//! written to a temporary sibling and renamed into place. A revision's words
//! are written before its summary flips to complete, and its summary before
//! the head moves; [`PageHead::reconcile`] repairs a head left behind by an
//! interrupted write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use deunicode::deunicode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{AnnotationStore, PageHead, Recorded, RunId, StoreError};
use crate::annotation::{
    RevisionAnnotation, RevisionId, RevisionMeta, TransitionStats, WordAnnotation,
};

const HEAD_FILE: &str = "head.json";
const SUMMARY_SUFFIX: &str = ".summary.json";

/// Longest sanitized page name kept in a directory name.
const MAX_PAGE_DIR_LENGTH: usize = 80;

/// Characters that are invalid in filenames on common filesystems.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Stores each page in its own directory of JSON files.
///
/// Operations on one page are serialized by a per-page mutex, so pages
/// annotated on different threads do not wait on each other. Each instance
/// claims pending revisions under its own run id; a pending revision claimed
/// by another instance is assumed abandoned and may be begun again. Writers
/// from several live processes are not coordinated.
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    run: RunId,
    pages: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            run: new_run_id(),
            pages: Mutex::new(HashMap::new()),
        })
    }

    /// Directory the store lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn page_lock(&self, page: &str) -> Arc<Mutex<()>> {
        let mut pages = self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(pages.entry(page.to_string()).or_default())
    }

    fn page_dir(&self, page: &str) -> PathBuf {
        self.root.join(page_dir_name(page))
    }

    fn words_path(&self, page: &str, revision: RevisionId) -> PathBuf {
        self.page_dir(page).join(format!("{}.json", revision))
    }

    fn summary_path(&self, page: &str, revision: RevisionId) -> PathBuf {
        self.page_dir(page).join(format!("{}{}", revision, SUMMARY_SUFFIX))
    }

    fn load_recorded(
        &self,
        page: &str,
        revision: RevisionId,
    ) -> Result<Option<Recorded>, StoreError> {
        let path = self.summary_path(page, revision);
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    fn save_recorded(&self, page: &str, recorded: &Recorded) -> Result<(), StoreError> {
        let dir = self.page_dir(page);
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        write_json(&self.summary_path(page, recorded.summary.revision_id), recorded)
    }

    fn load_head(&self, page: &str) -> Result<PageHead, StoreError> {
        let path = self.page_dir(page).join(HEAD_FILE);
        if !path.exists() {
            return Ok(PageHead::default());
        }
        let mut head: PageHead = read_json(&path)?;
        if let Some(claim) = head.pending {
            let pending = self.load_recorded(page, claim.revision)?;
            head.reconcile(pending.as_ref());
        }
        Ok(head)
    }

    fn save_head(&self, page: &str, head: &PageHead) -> Result<(), StoreError> {
        write_json(&self.page_dir(page).join(HEAD_FILE), head)
    }
}

impl AnnotationStore for JsonStore {
    fn begin(
        &self,
        meta: &RevisionMeta,
        parent: Option<RevisionId>,
    ) -> Result<RevisionAnnotation, StoreError> {
        let page = meta.page_id.as_str();
        let lock = self.page_lock(page);
        let _guard = guard(&lock);

        let mut head = self.load_head(page)?;
        let current = self.load_recorded(page, meta.revision_id)?;
        let recorded = head.begin(meta, parent, self.run, current.as_ref(), |p| {
            Ok(self
                .load_recorded(page, p)?
                .is_some_and(|r| r.summary.is_complete()))
        })?;

        self.save_recorded(page, &recorded)?;
        self.save_head(page, &head)?;
        Ok(recorded.summary)
    }

    fn complete(
        &self,
        meta: &RevisionMeta,
        annotations: &[WordAnnotation],
        stats: &TransitionStats,
    ) -> Result<RevisionAnnotation, StoreError> {
        let page = meta.page_id.as_str();
        let lock = self.page_lock(page);
        let _guard = guard(&lock);

        let mut head = self.load_head(page)?;
        let current = self.load_recorded(page, meta.revision_id)?;
        head.check_claim(meta, self.run, current.as_ref())?;

        write_json(&self.words_path(page, meta.revision_id), annotations)?;
        let recorded = head.complete(meta, self.run, current, stats)?;
        self.save_recorded(page, &recorded)?;
        self.save_head(page, &head)?;
        Ok(recorded.summary)
    }

    fn fail(&self, meta: &RevisionMeta, reason: &str) -> Result<RevisionAnnotation, StoreError> {
        let page = meta.page_id.as_str();
        let lock = self.page_lock(page);
        let _guard = guard(&lock);

        let mut head = self.load_head(page)?;
        let current = self.load_recorded(page, meta.revision_id)?;
        let recorded = head.fail(meta, self.run, current, reason)?;
        self.save_recorded(page, &recorded)?;
        self.save_head(page, &head)?;
        Ok(recorded.summary)
    }

    fn annotations(
        &self,
        page: &str,
        revision: RevisionId,
    ) -> Result<Vec<WordAnnotation>, StoreError> {
        let lock = self.page_lock(page);
        let _guard = guard(&lock);

        match self.load_recorded(page, revision)? {
            Some(r) if r.summary.is_complete() => read_json(&self.words_path(page, revision)),
            _ => Err(StoreError::NotFound {
                page: page.to_string(),
                revision,
            }),
        }
    }

    fn summaries(&self, page: &str) -> Result<Vec<RevisionAnnotation>, StoreError> {
        let lock = self.page_lock(page);
        let _guard = guard(&lock);

        let dir = self.page_dir(page);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let is_summary = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(SUMMARY_SUFFIX));
            if is_summary {
                records.push(read_json::<Recorded>(&entry.path())?);
            }
        }
        records.sort_by_key(|r| r.seq);
        Ok(records.into_iter().map(|r| r.summary).collect())
    }

    fn summary(
        &self,
        page: &str,
        revision: RevisionId,
    ) -> Result<Option<RevisionAnnotation>, StoreError> {
        let lock = self.page_lock(page);
        let _guard = guard(&lock);
        Ok(self.load_recorded(page, revision)?.map(|r| r.summary))
    }

    fn last_complete(&self, page: &str) -> Result<Option<RevisionAnnotation>, StoreError> {
        let lock = self.page_lock(page);
        let _guard = guard(&lock);

        match self.load_head(page)?.last_complete {
            Some(revision) => Ok(self.load_recorded(page, revision)?.map(|r| r.summary)),
            None => Ok(None),
        }
    }
}

fn guard(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run id for a freshly opened store: process id, open time and an
/// in-process counter, hashed.
fn new_run_id() -> RunId {
    static OPENED: AtomicU64 = AtomicU64::new(0);
    let now = Utc::now();
    let seed = format!(
        "{}:{}:{}:{}",
        std::process::id(),
        now.timestamp(),
        now.timestamp_subsec_nanos(),
        OPENED.fetch_add(1, Ordering::Relaxed)
    );
    fnv1a(seed.as_bytes())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Serde {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serde {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|source| StoreError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Directory name for a page id.
///
/// Transliterates to ASCII, turns whitespace into `_`, drops characters that
/// are invalid on common filesystems, trims dots and underscores from the
/// edges, truncates, and appends a hash of the raw id.
pub(crate) fn page_dir_name(page: &str) -> String {
    let ascii = deunicode(page);

    let mut name = String::with_capacity(ascii.len());
    let mut last_was_underscore = false;
    for c in ascii.chars() {
        if c.is_whitespace() || c == '_' {
            if !last_was_underscore {
                name.push('_');
                last_was_underscore = true;
            }
        } else if INVALID_CHARS.contains(&c) || c.is_control() {
            continue;
        } else {
            name.push(c);
            last_was_underscore = false;
        }
    }

    let trimmed = name.trim_matches(|c| c == '.' || c == '_');
    let truncated: String = trimmed.chars().take(MAX_PAGE_DIR_LENGTH).collect();
    let base = if truncated.is_empty() {
        "page".to_string()
    } else {
        truncated
    };

    format!("{}-{:016x}", base, fnv1a(page.as_bytes()))
}

/// 64-bit FNV-1a, stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
