// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-watch matching.
//!
//! Users carry two keyword lists for historical reasons: the current
//! watch list and the legacy notification-keyword list. Matching unions
//! the two, deduplicates, and tests each as a case- and
//! diacritic-insensitive substring of the deal's title and description.

use firsat_core::types::User;

use crate::payload::normalize_for_match;

/// The union of a user's keyword lists, deduplicated, original casing
/// preserved for display.
pub fn watched_keywords(user: &User) -> Vec<String> {
    let mut seen = Vec::new();
    for keyword in user
        .watch_keywords
        .iter()
        .chain(user.notification_keywords.iter())
    {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen
            .iter()
            .any(|s: &String| normalize_for_match(s) == normalize_for_match(trimmed))
        {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

/// The first of the user's watched keywords contained in the normalized
/// haystack, if any. The haystack must already be normalized with
/// [`normalize_for_match`].
pub fn matching_keyword(user: &User, normalized_haystack: &str) -> Option<String> {
    watched_keywords(user)
        .into_iter()
        .find(|keyword| normalized_haystack.contains(&normalize_for_match(keyword)))
}

/// Splits messages into transport-sized batches.
pub fn chunk<T>(items: Vec<T>, batch_size: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::new();
    let mut current = Vec::new();
    for item in items {
        current.push(item);
        if current.len() == batch_size {
            batches.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(watch: &[&str], legacy: &[&str]) -> User {
        User {
            id: "u1".into(),
            watch_keywords: watch.iter().map(|s| s.to_string()).collect(),
            notification_keywords: legacy.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn lists_are_unioned_and_deduplicated() {
        let u = user(&["rtx", "Klavye"], &["klavye", "ssd", ""]);
        let keywords = watched_keywords(&u);
        assert_eq!(keywords, vec!["rtx", "Klavye", "ssd"]);
    }

    #[test]
    fn matching_is_diacritic_and_case_insensitive() {
        let u = user(&["süpürge"], &[]);
        let haystack = normalize_for_match("Robot SUPURGE fırsatı");
        assert_eq!(matching_keyword(&u, &haystack), Some("süpürge".into()));
    }

    #[test]
    fn no_keyword_no_match() {
        let u = user(&["rtx"], &[]);
        let haystack = normalize_for_match("Kahve makinesi indirimi");
        assert_eq!(matching_keyword(&u, &haystack), None);
    }

    #[test]
    fn chunking_respects_batch_size() {
        let batches = chunk((0..7).collect::<Vec<_>>(), 3);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn empty_input_chunks_to_nothing() {
        let batches = chunk(Vec::<i32>::new(), 300);
        assert!(batches.is_empty());
    }
}
