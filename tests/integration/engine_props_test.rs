//! Property tests for propagation through the bundled word diff

use std::collections::HashSet;

use proptest::prelude::*;

use wordblame::{advance, seed, RevisionMeta, TieBreak, WordAnnotation, WordDiff};

fn text() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["the", "cat", "sat", "on", "mat", "."]),
        0..24,
    )
    .prop_map(|words| words.into_iter().map(str::to_string).collect())
}

fn tie_break() -> impl Strategy<Value = TieBreak> {
    prop_oneof![Just(TieBreak::First), Just(TieBreak::Nearest)]
}

fn parent(words: &[String]) -> Vec<WordAnnotation> {
    seed(words, &RevisionMeta::new("Page", 1, "alice")).annotations
}

fn child_meta() -> RevisionMeta {
    RevisionMeta::new("Page", 2, "bob")
}

proptest! {
    #[test]
    fn child_is_dense_and_matches_child_words(
        before in text(),
        after in text(),
        tie in tie_break(),
    ) {
        let parent = parent(&before);
        let step = advance(Some(parent.as_slice()), &after, &child_meta(), &WordDiff, tie).unwrap();

        let positions: Vec<usize> = step.annotations.iter().map(|a| a.position).collect();
        prop_assert_eq!(positions, (0..after.len()).collect::<Vec<_>>());

        let words: Vec<&str> = step.annotations.iter().map(|a| a.word.as_str()).collect();
        prop_assert_eq!(words, after.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn counts_are_conserved(before in text(), after in text(), tie in tie_break()) {
        let parent = parent(&before);
        let step = advance(Some(parent.as_slice()), &after, &child_meta(), &WordDiff, tie).unwrap();
        let stats = step.stats;

        prop_assert_eq!(stats.word_count(), after.len());
        prop_assert_eq!(stats.removed, before.len() - stats.equal - stats.moved);
        prop_assert_eq!(
            step.annotations.iter().filter(|a| a.is_moved).count(),
            stats.moved
        );
    }

    #[test]
    fn moved_words_keep_their_author(before in text(), after in text(), tie in tie_break()) {
        let parent = parent(&before);
        let step = advance(Some(parent.as_slice()), &after, &child_meta(), &WordDiff, tie).unwrap();

        for annotation in &step.annotations {
            if annotation.origin.revision == 1 {
                prop_assert_eq!(&annotation.author, "alice");
            } else {
                prop_assert_eq!(&annotation.author, "bob");
                prop_assert!(!annotation.is_moved);
            }
        }
    }

    #[test]
    fn origins_are_unique(before in text(), after in text(), tie in tie_break()) {
        let parent = parent(&before);
        let step = advance(Some(parent.as_slice()), &after, &child_meta(), &WordDiff, tie).unwrap();

        let origins: HashSet<_> = step.annotations.iter().map(|a| a.origin).collect();
        prop_assert_eq!(origins.len(), step.annotations.len());
    }

    #[test]
    fn propagation_is_idempotent(before in text(), after in text(), tie in tie_break()) {
        let parent = parent(&before);
        let first = advance(Some(parent.as_slice()), &after, &child_meta(), &WordDiff, tie).unwrap();
        let second = advance(Some(parent.as_slice()), &after, &child_meta(), &WordDiff, tie).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn first_revision_is_all_new(words in text()) {
        let meta = RevisionMeta::new("Page", 7, "carol");
        let step = advance(None, &words, &meta, &WordDiff, TieBreak::First).unwrap();

        prop_assert_eq!(step.stats.added, words.len());
        for annotation in &step.annotations {
            prop_assert_eq!(&annotation.author, "carol");
            prop_assert!(!annotation.is_moved);
            prop_assert_eq!(annotation.origin.revision, 7);
        }
    }
}
