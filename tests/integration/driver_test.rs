//! Driver runs against the on-disk store

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use wordblame::driver::Revision;
use wordblame::{
    AnnotationStore, DriverError, JsonStore, MemoryStore, PageAnnotator, PageHistory, Status,
    StoreError, TieBreak,
};

use crate::helpers::{fixture, load_history};

#[test]
fn cats_history_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let summary = PageAnnotator::new(&store)
        .annotate(&load_history("cats.json"))
        .unwrap();

    assert_eq!(summary.revisions_processed, 3);
    assert_eq!(summary.words_processed, 23);
    assert_eq!(summary.moves_detected, 2);

    let words = store.annotations("Cats", 2).unwrap();
    assert!(words.iter().all(|w| w.word != "sat"));
    let moved: Vec<&str> = words
        .iter()
        .filter(|w| w.is_moved)
        .map(|w| w.word.as_str())
        .collect();
    assert_eq!(moved, vec!["mat", "the"]);

    let summaries = store.summaries("Cats").unwrap();
    let counts: Vec<_> = summaries
        .iter()
        .map(|s| (s.revision_id, s.status, s.word_count, s.added_count, s.moved_count, s.removed_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            (1, Status::Complete, 7, 7, 0, 0),
            (2, Status::Complete, 8, 2, 2, 1),
            (3, Status::Complete, 8, 0, 0, 0),
        ]
    );
}

#[test]
fn json_and_memory_stores_agree() {
    let history = load_history("dogs.json");
    let dir = TempDir::new().unwrap();
    let on_disk = JsonStore::open(dir.path()).unwrap();
    let in_memory = MemoryStore::new();

    PageAnnotator::new(&on_disk).annotate(&history).unwrap();
    PageAnnotator::new(&in_memory).annotate(&history).unwrap();

    assert_eq!(
        on_disk.annotations("Dogs", 11).unwrap(),
        in_memory.annotations("Dogs", 11).unwrap()
    );
}

#[test]
fn only_the_new_word_is_credited_to_the_editor() {
    for tie_break in [TieBreak::First, TieBreak::Nearest] {
        let store = MemoryStore::new();
        PageAnnotator::new(&store)
            .with_tie_break(tie_break)
            .annotate(&load_history("dogs.json"))
            .unwrap();

        let words = store.annotations("Dogs", 11).unwrap();
        let by_erin: Vec<&str> = words
            .iter()
            .filter(|w| w.author == "erin")
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(by_erin, vec!["very"], "tie break {}", tie_break);
    }
}

#[test]
fn resume_after_interruption_matches_a_full_run() {
    let history = load_history("cats.json");

    let full = MemoryStore::new();
    PageAnnotator::new(&full).annotate(&history).unwrap();

    let partial = MemoryStore::new();
    let mut truncated = history.clone();
    truncated.revisions.truncate(1);
    PageAnnotator::new(&partial).annotate(&truncated).unwrap();

    let stop = Arc::new(AtomicBool::new(true));
    let err = PageAnnotator::new(&partial)
        .with_stop_flag(stop)
        .annotate(&history)
        .unwrap_err();
    assert!(matches!(err, DriverError::Interrupted { completed: 0, .. }));

    let resumed = PageAnnotator::new(&partial).annotate(&history).unwrap();
    assert_eq!(resumed.resumed_from, Some(1));
    assert_eq!(resumed.revisions_processed, 2);
    assert_eq!(
        partial.annotations("Cats", 3).unwrap(),
        full.annotations("Cats", 3).unwrap()
    );
}

#[test]
fn out_of_order_history_is_rejected_before_any_work() {
    let store = MemoryStore::new();
    let err = PageAnnotator::new(&store)
        .annotate(&load_history("out_of_order.json"))
        .unwrap_err();

    assert!(matches!(err, DriverError::OutOfOrder { revision: 2, previous: 1, .. }));
    assert!(store.summaries("Birds").unwrap().is_empty());
}

#[test]
fn annotate_files_keeps_input_order() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let files = vec![
        fixture("dogs.json"),
        fixture("malformed.json"),
        fixture("cats.json"),
    ];

    let outcomes = PageAnnotator::new(&store).annotate_files(&files, 2).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].result.as_ref().unwrap().page_id, "Dogs");
    assert!(matches!(outcomes[1].result, Err(DriverError::Parse { .. })));
    assert_eq!(outcomes[2].result.as_ref().unwrap().page_id, "Cats");
    assert_eq!(outcomes[1].source, files[1]);
}

#[test]
fn long_history_on_disk() {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut text = String::new();
    let revisions: Vec<Revision> = (1..=400)
        .map(|id| {
            text.push_str(&format!(" word{}", id));
            Revision {
                id,
                author: format!("editor{}", id % 7),
                timestamp: start + Duration::minutes(id as i64),
                text: text.clone(),
            }
        })
        .collect();
    let history = PageHistory {
        page_id: "Long".to_string(),
        title: None,
        revisions,
    };

    let dir = TempDir::new().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let mut truncated = history.clone();
    truncated.revisions.truncate(250);
    PageAnnotator::new(&store).annotate(&truncated).unwrap();

    let resumed = PageAnnotator::new(&store).annotate(&history).unwrap();
    assert_eq!(resumed.resumed_from, Some(250));
    assert_eq!(resumed.revisions_processed, 150);

    let words = store.annotations("Long", 400).unwrap();
    assert_eq!(words.len(), 400);
    assert_eq!(words[0].author, "editor1");
    assert_eq!(words[399].author, "editor1");
    assert_eq!(words[6].author, "editor0");
    assert!(words.iter().all(|w| !w.is_moved));

    let summaries = store.summaries("Long").unwrap();
    assert_eq!(summaries.len(), 400);
    assert!(summaries.iter().all(|s| s.status == Status::Complete));
    assert_eq!(summaries.last().unwrap().revision_id, 400);
}

#[test]
fn same_file_twice_never_double_annotates() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    let files = vec![fixture("cats.json"), fixture("cats.json")];

    let outcomes = PageAnnotator::new(&store).annotate_files(&files, 2).unwrap();

    assert!(outcomes.iter().any(|o| o.result.is_ok()));
    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            assert!(
                matches!(
                    err,
                    DriverError::Store(StoreError::InFlight { .. })
                        | DriverError::Store(StoreError::AlreadyComplete { .. })
                        | DriverError::Store(StoreError::StaleParent { .. })
                ),
                "unexpected error: {}",
                err
            );
        }
    }

    let processed: usize = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .map(|s| s.revisions_processed)
        .sum();
    assert!(processed <= 3);
    assert_eq!(store.last_complete("Cats").unwrap().unwrap().revision_id, 3);
    assert_eq!(store.summaries("Cats").unwrap().len(), 3);
}
