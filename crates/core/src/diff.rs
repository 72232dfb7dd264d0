//! Word-level difference between an original and a received message.
//!
//! This is a set difference over normalized tokens, not a sequence alignment. Moving a word or
//! repeating it more or fewer times produces no entries; only words present on one side and
//! absent on the other are reported.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Words that appear on only one side of a message pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDiffResult {
    /// In `received` but not in `original`, in order of first appearance.
    pub added: Vec<String>,
    /// In `original` but not in `received`, in order of first appearance.
    pub removed: Vec<String>,
}

impl WordDiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Lower-case `text`, drop everything except word characters and whitespace, then split on
/// whitespace. Word characters are ASCII letters, digits and `_`.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_owned).collect()
}

pub fn diff_words(original: &str, received: &str) -> WordDiffResult {
    let original = tokenize(original);
    let received = tokenize(received);

    WordDiffResult {
        added: missing_from(&received, &original),
        removed: missing_from(&original, &received),
    }
}

/// Tokens of `from` absent in `other`, deduplicated, first-occurrence order.
fn missing_from(from: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    let mut seen: HashSet<&String> = HashSet::new();
    from.iter()
        .filter(|t| !other.contains(t.as_str()) && seen.insert(*t))
        .cloned()
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn swapping_inputs_swaps_sides(a in any::<String>(), b in any::<String>()) {
            let forward = diff_words(&a, &b);
            let backward = diff_words(&b, &a);
            prop_assert_eq!(forward.added, backward.removed);
            prop_assert_eq!(forward.removed, backward.added);
        }

        #[test]
        fn text_never_differs_from_itself(a in any::<String>()) {
            prop_assert!(diff_words(&a, &a).is_empty());
        }

        #[test]
        fn word_lists_swap_sides(
            a in prop::collection::vec("[A-Za-z]{1,6}[,.!]?", 0..12),
            b in prop::collection::vec("[A-Za-z]{1,6}[,.!]?", 0..12),
        ) {
            let (a, b) = (a.join(" "), b.join(" "));
            let forward = diff_words(&a, &b);
            let backward = diff_words(&b, &a);
            prop_assert_eq!(forward.added, backward.removed);
            prop_assert_eq!(forward.removed, backward.added);
        }
    }
}
