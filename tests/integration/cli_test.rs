//! Integration tests for the wordblame CLI

use predicates::prelude::*;

use wordblame::WordAnnotation;

use crate::helpers::{fixture, Workspace};

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let ws = Workspace::new();
    ws.wordblame()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("annotate"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("tokenize"));
}

#[test]
fn version_includes_package_version() {
    let ws = Workspace::new();
    ws.wordblame()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn annotate_without_files_is_a_usage_error() {
    let ws = Workspace::new();
    ws.wordblame()
        .arg("annotate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<FILE>"));
}

// ============================================================================
// Annotate
// ============================================================================

#[test]
fn annotate_reports_page_counts() {
    let ws = Workspace::new();
    ws.annotate(&["cats.json"])
        .success()
        .stdout(predicate::str::contains(
            "Cats: 3 revision(s), 23 word(s), 2 move(s)",
        ))
        .stdout(predicate::str::contains("Annotations stored in"));
}

#[test]
fn annotate_twice_resumes_with_nothing_to_do() {
    let ws = Workspace::new();
    ws.annotate(&["cats.json"]).success();
    ws.annotate(&["cats.json"])
        .success()
        .stdout(predicate::str::contains("Cats: 0 revision(s), 0 word(s), 0 move(s)"))
        .stdout(predicate::str::contains("resumed after revision 3"));
}

#[test]
fn annotate_several_pages() {
    let ws = Workspace::new();
    let mut cmd = ws.wordblame();
    cmd.args(["annotate", "--jobs", "2", "--store"])
        .arg(ws.store())
        .arg(fixture("cats.json"))
        .arg(fixture("dogs.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Cats: 3 revision(s)"))
        .stdout(predicate::str::contains("Dogs: 2 revision(s), 15 word(s), 3 move(s)"));
}

#[test]
fn failing_page_does_not_stop_the_others() {
    let ws = Workspace::new();
    ws.annotate(&["out_of_order.json", "cats.json"])
        .code(1)
        .stdout(predicate::str::contains("Cats: 3 revision(s)"))
        .stderr(predicate::str::contains("out_of_order.json"))
        .stderr(predicate::str::contains("older than the preceding revision"))
        .stderr(predicate::str::contains("1 of 2 page(s) failed"));
}

#[test]
fn malformed_history_is_reported() {
    let ws = Workspace::new();
    ws.annotate(&["malformed.json"])
        .code(1)
        .stderr(predicate::str::contains("malformed history"));
}

#[test]
fn missing_history_is_reported() {
    let ws = Workspace::new();
    ws.annotate(&["does-not-exist.json"])
        .code(1)
        .stderr(predicate::str::contains("does-not-exist.json"));
}

#[test]
fn tie_break_flag_is_accepted() {
    let ws = Workspace::new();
    let mut cmd = ws.wordblame();
    cmd.args(["annotate", "--tie-break", "nearest", "--store"])
        .arg(ws.store())
        .arg(fixture("dogs.json"))
        .assert()
        .success();
}

// ============================================================================
// Show and Stats
// ============================================================================

#[test]
fn show_json_carries_authorship() {
    let ws = Workspace::new();
    ws.annotate(&["cats.json"]).success();

    let output = ws
        .wordblame()
        .args(["show", "Cats", "--revision", "2", "--json", "--store"])
        .arg(ws.store())
        .output()
        .unwrap();
    assert!(output.status.success());

    let words: Vec<WordAnnotation> = serde_json::from_slice(&output.stdout).unwrap();
    let texts: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(texts, vec!["The", "mat", "had", "the", "cat", "on", "it", "."]);

    for moved in [&words[1], &words[3]] {
        assert_eq!(moved.author, "alice");
        assert!(moved.is_moved);
    }
    assert!(!words[4].is_moved, "cat is carried by the diff");

    for new_word in [&words[2], &words[6]] {
        assert_eq!(new_word.author, "bob");
        assert!(!new_word.is_moved);
    }
    assert!(words.iter().all(|w| w.revision_id == 2));
}

#[test]
fn show_table_for_earlier_revision() {
    let ws = Workspace::new();
    ws.annotate(&["cats.json"]).success();

    ws.wordblame()
        .args(["show", "Cats", "--revision", "1", "--store"])
        .arg(ws.store())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cats @ revision 1: 7 word(s), 0 moved"))
        .stdout(predicate::str::contains("sat"))
        .stdout(predicate::str::contains("moved").count(1));
}

#[test]
fn show_unknown_page_fails() {
    let ws = Workspace::new();
    ws.wordblame()
        .args(["show", "Nowhere", "--store"])
        .arg(ws.store())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No annotated revisions"));
}

#[test]
fn stats_credits_authors() {
    let ws = Workspace::new();
    ws.annotate(&["cats.json"]).success();

    ws.wordblame()
        .args(["stats", "Cats", "--revision", "2", "--store"])
        .arg(ws.store())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cats @ revision 2: 8 word(s) by 2 author(s)"))
        .stdout(predicate::str::is_match(r"alice\s+6\s+75\.0%\s+2").unwrap())
        .stdout(predicate::str::is_match(r"bob\s+2\s+25\.0%\s+0").unwrap());
}

#[test]
fn stats_of_latest_revision_as_json() {
    let ws = Workspace::new();
    ws.annotate(&["cats.json"]).success();

    let output = ws
        .wordblame()
        .args(["stats", "Cats", "--json", "--store"])
        .arg(ws.store())
        .output()
        .unwrap();
    assert!(output.status.success());

    // Revision 3 only reformats markup, so nothing is moved any more
    let credits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(credits[0]["author"], "alice");
    assert_eq!(credits[0]["words"], 6);
    assert_eq!(credits[0]["moved"], 0);
    assert_eq!(credits[1]["author"], "bob");
}

// ============================================================================
// Tokenize
// ============================================================================

#[test]
fn tokenize_file() {
    let ws = Workspace::new();
    ws.wordblame()
        .arg("tokenize")
        .arg(fixture("markup.txt"))
        .assert()
        .success()
        .stdout("The\nhas\ntext\ncontent.\n");
}

#[test]
fn tokenize_units_from_stdin() {
    let ws = Workspace::new();
    ws.wordblame()
        .args(["tokenize", "--units"])
        .write_stdin("The mat.")
        .assert()
        .success()
        .stdout("The\nmat\n.\n");
}

// ============================================================================
// Config and Completions
// ============================================================================

#[test]
fn config_show_prints_defaults() {
    let ws = Workspace::new();
    ws.wordblame()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[engine]"))
        .stdout(predicate::str::contains("tie_break = \"first\""));
}

#[test]
fn config_migrate_creates_then_is_up_to_date() {
    let ws = Workspace::new();
    ws.wordblame()
        .args(["config", "migrate", "--yes"])
        .assert()
        .success();
    assert!(ws.config().exists());

    ws.wordblame()
        .args(["config", "migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));
}

#[test]
fn config_tie_break_is_used_by_annotate() {
    let ws = Workspace::new();
    std::fs::write(ws.config(), "[engine]\ntie_break = \"nearest\"\n").unwrap();

    ws.annotate(&["dogs.json"]).success();
}

#[test]
fn completions_for_bash() {
    let ws = Workspace::new();
    ws.wordblame()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wordblame"));
}
