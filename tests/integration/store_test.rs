//! Chain rules shared by every store implementation

use tempfile::TempDir;

use wordblame::{
    seed, AnnotationStore, JsonStore, MemoryStore, RevisionMeta, Status, StoreError,
    TransitionStats,
};

fn meta(revision: u64) -> RevisionMeta {
    RevisionMeta::new("Main Page", revision, "alice")
}

fn complete(store: &dyn AnnotationStore, revision: u64, parent: Option<u64>) {
    let meta = meta(revision);
    let words = vec!["hello".to_string(), "world".to_string()];
    let result = seed(&words, &meta);
    store.begin(&meta, parent).unwrap();
    store
        .complete(&meta, &result.annotations, &result.stats)
        .unwrap();
}

/// Run `check` against a fresh memory store and a fresh JSON store.
fn each_store(check: impl Fn(&dyn AnnotationStore)) {
    check(&MemoryStore::new());

    let dir = TempDir::new().unwrap();
    check(&JsonStore::open(dir.path()).unwrap());
}

#[test]
fn child_cannot_start_before_parent_completes() {
    each_store(|store| {
        store.begin(&meta(1), None).unwrap();
        let err = store.begin(&meta(2), Some(1)).unwrap_err();
        assert!(matches!(err, StoreError::InFlight { pending: 1, .. }));
    });
}

#[test]
fn missing_parent_is_rejected() {
    each_store(|store| {
        let err = store.begin(&meta(2), Some(1)).unwrap_err();
        assert!(matches!(err, StoreError::MissingParent { parent: 1, .. }));
    });
}

#[test]
fn only_the_head_can_be_extended() {
    each_store(|store| {
        complete(store, 1, None);
        complete(store, 2, Some(1));

        let err = store.begin(&meta(3), Some(1)).unwrap_err();
        assert!(matches!(err, StoreError::StaleParent { head: Some(2), .. }));
        complete(store, 3, Some(2));
    });
}

#[test]
fn completed_revision_is_immutable() {
    each_store(|store| {
        complete(store, 1, None);
        let before = store.summary("Main Page", 1).unwrap().unwrap();

        assert!(matches!(
            store.begin(&meta(1), None),
            Err(StoreError::AlreadyComplete { .. })
        ));
        assert!(matches!(
            store.fail(&meta(1), "too late"),
            Err(StoreError::AlreadyComplete { .. })
        ));
        assert_eq!(store.summary("Main Page", 1).unwrap().unwrap(), before);
    });
}

#[test]
fn failed_revision_records_reason_and_keeps_head() {
    each_store(|store| {
        complete(store, 1, None);
        store.begin(&meta(2), Some(1)).unwrap();
        let failed = store.fail(&meta(2), "diff does not cover parent").unwrap();

        assert_eq!(failed.status, Status::Failed);
        assert_eq!(failed.error.as_deref(), Some("diff does not cover parent"));
        assert_eq!(store.last_complete("Main Page").unwrap().unwrap().revision_id, 1);
        assert!(matches!(
            store.annotations("Main Page", 2),
            Err(StoreError::NotFound { .. })
        ));

        // A retry of the failed revision is allowed
        store.begin(&meta(2), Some(1)).unwrap();
        store
            .complete(&meta(2), &[], &TransitionStats::default())
            .unwrap();
        assert!(store.annotations("Main Page", 2).unwrap().is_empty());
    });
}

#[test]
fn summaries_keep_start_order() {
    each_store(|store| {
        complete(store, 5, None);
        complete(store, 3, Some(5));
        let ids: Vec<u64> = store
            .summaries("Main Page")
            .unwrap()
            .iter()
            .map(|s| s.revision_id)
            .collect();
        assert_eq!(ids, vec![5, 3]);
    });
}
