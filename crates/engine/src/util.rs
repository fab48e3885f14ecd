//! Internal helpers for text comparison.

use std::cmp::Ordering;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Primary collation key: compatibility-decomposed, accents stripped,
/// lowercased.
fn collation_key(input: &str) -> String {
    input
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-aware comparison of display text.
///
/// Base letters decide first (`"éclair"` sorts next to `"eclair"`, before
/// `"Zebra"`); the raw text only breaks ties between variants.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_and_case_do_not_dominate() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Żabka", "Zoo"), Ordering::Less);
        assert_eq!(collate("éclair", "eclairs"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }
}
