use std::collections::HashSet;

use proptest::prelude::*;

use clipshelf::history::{HistoryStore, HISTORY_LIMIT};

fn capture_sequence() -> impl Strategy<Value = Vec<String>> {
    // 小字母表保证大量重复捕获
    prop::collection::vec("[a-e]{0,2}", 0..300)
}

proptest! {
    #[test]
    fn history_stays_bounded_and_unique(captures in capture_sequence()) {
        let mut history = HistoryStore::default();
        for content in &captures {
            history.record(content);
        }

        let snapshot = history.snapshot();
        prop_assert!(snapshot.len() <= HISTORY_LIMIT);

        let unique: HashSet<_> = snapshot.iter().map(|h| h.content.as_str()).collect();
        prop_assert_eq!(unique.len(), snapshot.len());
        prop_assert!(snapshot.iter().all(|h| !h.content.is_empty()));

        for pair in snapshot.windows(2) {
            prop_assert!(pair[0].captured_at > pair[1].captured_at);
        }
    }

    #[test]
    fn newest_capture_is_always_first(captures in capture_sequence()) {
        let mut history = HistoryStore::default();
        for content in &captures {
            history.record(content);
        }

        match captures.iter().rev().find(|c| !c.is_empty()) {
            Some(last) => prop_assert_eq!(&history.snapshot()[0].content, last),
            None => prop_assert!(history.is_empty()),
        }
    }

    #[test]
    fn ids_are_unique_across_captures(captures in prop::collection::vec("[a-z]{1,3}", 1..120)) {
        let mut history = HistoryStore::default();
        let mut seen = HashSet::new();
        for content in &captures {
            if let Some(item) = history.record(content) {
                prop_assert!(seen.insert(item.id));
            }
        }
    }
}

#[test]
fn recapture_reorders_without_growing() {
    let mut history = HistoryStore::default();
    history.record("a");
    history.record("b");
    history.record("a");

    let contents: Vec<_> = history.snapshot().into_iter().map(|h| h.content).collect();
    assert_eq!(contents, vec!["a", "b"]);
}
