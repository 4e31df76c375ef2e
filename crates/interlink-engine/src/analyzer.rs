//! Text analysis: tokenization, keyword extraction, and set similarity.
//!
//! Everything here is pure and deterministic.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Common English function words dropped from keyword sets.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should",
];

/// Default number of keywords kept by [`extract_keywords`].
pub const DEFAULT_KEYWORD_LIMIT: usize = 20;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("non-word pattern is valid"));

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Lowercase `text` and split it on non-word runs, dropping empty pieces.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .split(&lowered)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercased token set of `text`, stop words included.
#[must_use]
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// First `limit` non-stop-word tokens longer than two characters, in source order.
///
/// Repeated words are kept; callers that need a set collect the result.
#[must_use]
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|token| token.chars().count() > 2 && !STOP_WORD_SET.contains(token.as_str()))
        .take(limit)
        .collect()
}

/// [`extract_keywords`] collected into a set.
#[must_use]
pub fn keyword_set(text: &str, limit: usize) -> HashSet<String> {
    extract_keywords(text, limit).into_iter().collect()
}

/// Jaccard index |A ∩ B| / |A ∪ B|; zero when the union is empty.
#[must_use]
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Split content on `.`, `!` and `?`, dropping blank sentences.
///
/// Returned sentences are trimmed and carry no terminator.
#[must_use]
pub fn split_sentences(content: &str) -> Vec<&str> {
    content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn stop_word_list_has_thirty_entries() {
        assert_eq!(STOP_WORDS.len(), 30);
        assert_eq!(STOP_WORD_SET.len(), 30);
    }

    #[test]
    fn tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = tokenize("The Ritz-London, Piccadilly!");
        assert_eq!(tokens, vec!["the", "ritz", "london", "piccadilly"]);
    }

    #[test]
    fn extract_keywords_drops_stop_words_and_short_tokens() {
        let keywords = extract_keywords(
            "The Ritz London is the most iconic luxury hotel in the city.",
            DEFAULT_KEYWORD_LIMIT,
        );
        assert_eq!(
            keywords,
            vec!["ritz", "london", "most", "iconic", "luxury", "hotel", "city"]
        );
    }

    #[test]
    fn extract_keywords_truncates_in_source_order() {
        let text = (0..30)
            .map(|i| format!("word{i:02}"))
            .collect::<Vec<_>>()
            .join(" ");
        let keywords = extract_keywords(&text, DEFAULT_KEYWORD_LIMIT);
        assert_eq!(keywords.len(), 20);
        assert_eq!(keywords[0], "word00");
        assert_eq!(keywords[19], "word19");
    }

    #[test]
    fn extract_keywords_keeps_repeats() {
        let keywords = extract_keywords("hotel hotel hotel", DEFAULT_KEYWORD_LIMIT);
        assert_eq!(keywords.len(), 3);
        assert_eq!(keyword_set("hotel hotel hotel", DEFAULT_KEYWORD_LIMIT).len(), 1);
    }

    #[test]
    fn jaccard_similarity_basics() {
        let a = set(&["ritz", "london", "hotel"]);
        let b = set(&["ritz", "london"]);
        assert!((jaccard_similarity(&a, &b) - 2.0 / 3.0).abs() < 1e-12);

        assert_eq!(jaccard_similarity(&a, &a), 1.0);
        assert_eq!(jaccard_similarity(&a, &set(&["paris"])), 0.0);
    }

    #[test]
    fn jaccard_similarity_of_empty_sets_is_zero() {
        let empty = HashSet::new();
        assert_eq!(jaccard_similarity(&empty, &empty), 0.0);
        assert_eq!(jaccard_similarity(&empty, &set(&["ritz"])), 0.0);
    }

    #[test]
    fn split_sentences_discards_blank_pieces() {
        let sentences = split_sentences("First one. Second!  ?Third?...   ");
        assert_eq!(sentences, vec!["First one", "Second", "Third"]);
        assert!(split_sentences("  ...  ").is_empty());
    }

    proptest! {
        #[test]
        fn jaccard_is_bounded_and_symmetric(
            a in proptest::collection::hash_set("[a-e]{1,2}", 0..8),
            b in proptest::collection::hash_set("[a-e]{1,2}", 0..8),
        ) {
            let ab = jaccard_similarity(&a, &b);
            let ba = jaccard_similarity(&b, &a);
            prop_assert!((0.0..=1.0).contains(&ab));
            prop_assert!((ab - ba).abs() < 1e-12);
        }

        #[test]
        fn keywords_never_contain_stop_words_or_short_tokens(text in "[A-Za-z ,.!?]{0,200}") {
            let keywords = extract_keywords(&text, DEFAULT_KEYWORD_LIMIT);
            prop_assert!(keywords.len() <= DEFAULT_KEYWORD_LIMIT);
            for keyword in &keywords {
                prop_assert!(keyword.chars().count() > 2);
                prop_assert!(!STOP_WORDS.contains(&keyword.as_str()));
            }
        }
    }
}
