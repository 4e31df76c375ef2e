//! Relevance scoring of a candidate page against the source page.
//!
//! The score is a fixed-weight sum of four signals:
//!
//! | Signal              | Weight | Computation                                          |
//! |---------------------|--------|------------------------------------------------------|
//! | title similarity    | 0.4    | Jaccard of lowercase title token sets                |
//! | keyword overlap     | 0.3    | Jaccard of content keywords vs. candidate title keywords |
//! | category relevance  | 0.2    | lookup in the [`CategoryWeights`] table              |
//! | semantic similarity | 0.1    | same function as keyword overlap                     |
//!
//! The semantic signal duplicates keyword overlap, so keyword overlap
//! effectively carries 0.4 of the score.

use std::collections::HashSet;

use serde::Serialize;

use interlink_core::config::CategoryWeights;

use crate::analyzer::{jaccard_similarity, keyword_set, token_set, DEFAULT_KEYWORD_LIMIT};

pub const TITLE_WEIGHT: f64 = 0.4;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const CATEGORY_WEIGHT: f64 = 0.2;
pub const SEMANTIC_WEIGHT: f64 = 0.1;

/// Per-signal values behind a score, before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub title_similarity: f64,
    pub keyword_overlap: f64,
    pub category_relevance: f64,
    pub semantic_similarity: f64,
}

impl ScoreBreakdown {
    /// Weighted sum, clamped to at most 1.0.
    #[must_use]
    pub fn total(&self) -> f64 {
        let sum = self.title_similarity * TITLE_WEIGHT
            + self.keyword_overlap * KEYWORD_WEIGHT
            + self.category_relevance * CATEGORY_WEIGHT
            + self.semantic_similarity * SEMANTIC_WEIGHT;
        sum.min(1.0)
    }
}

/// Source-side token sets, computed once and reused for every candidate.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    title_tokens: HashSet<String>,
    content_keywords: HashSet<String>,
}

/// Scores (source, candidate) pairs. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    category_weights: CategoryWeights,
    keyword_limit: usize,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(CategoryWeights::default())
    }
}

impl RelevanceScorer {
    #[must_use]
    pub fn new(category_weights: CategoryWeights) -> Self {
        Self {
            category_weights,
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }

    #[must_use]
    pub fn with_keyword_limit(mut self, keyword_limit: usize) -> Self {
        self.keyword_limit = keyword_limit;
        self
    }

    #[must_use]
    pub fn profile(&self, source_content: &str, source_title: &str) -> SourceProfile {
        SourceProfile {
            title_tokens: token_set(source_title),
            content_keywords: keyword_set(source_content, self.keyword_limit),
        }
    }

    /// Relevance of a candidate to the source, in [0, 1].
    #[must_use]
    pub fn score(
        &self,
        source_content: &str,
        source_title: &str,
        candidate_title: &str,
        candidate_category: &str,
    ) -> f64 {
        let profile = self.profile(source_content, source_title);
        self.score_profile(&profile, candidate_title, candidate_category)
    }

    #[must_use]
    pub fn score_profile(
        &self,
        profile: &SourceProfile,
        candidate_title: &str,
        candidate_category: &str,
    ) -> f64 {
        self.breakdown(profile, candidate_title, candidate_category)
            .total()
    }

    #[must_use]
    pub fn breakdown(
        &self,
        profile: &SourceProfile,
        candidate_title: &str,
        candidate_category: &str,
    ) -> ScoreBreakdown {
        let candidate_keywords = keyword_set(candidate_title, self.keyword_limit);
        let keyword_overlap = jaccard_similarity(&profile.content_keywords, &candidate_keywords);

        ScoreBreakdown {
            title_similarity: jaccard_similarity(
                &profile.title_tokens,
                &token_set(candidate_title),
            ),
            keyword_overlap,
            category_relevance: self.category_weights.weight(candidate_category),
            semantic_similarity: keyword_overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn signal_weights_sum_to_one() {
        let sum = TITLE_WEIGHT + KEYWORD_WEIGHT + CATEGORY_WEIGHT + SEMANTIC_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn breakdown_matches_hand_computed_signals() {
        let scorer = RelevanceScorer::default();
        let profile = scorer.profile(
            "The Ritz London is the most iconic luxury hotel in the city.",
            "Best Luxury Hotels in London",
        );
        let breakdown = scorer.breakdown(&profile, "The Ritz London", "luxury_hotels");

        // {best, luxury, hotels, in, london} vs {the, ritz, london}
        assert!((breakdown.title_similarity - 1.0 / 7.0).abs() < 1e-12);
        // 7 content keywords, {ritz, london} shared
        assert!((breakdown.keyword_overlap - 2.0 / 7.0).abs() < 1e-12);
        assert!((breakdown.category_relevance - 0.9).abs() < 1e-12);
        assert_eq!(breakdown.semantic_similarity, breakdown.keyword_overlap);

        let expected = 0.4 / 7.0 + 0.3 * 2.0 / 7.0 + 0.2 * 0.9 + 0.1 * 2.0 / 7.0;
        assert!((breakdown.total() - expected).abs() < 1e-12);
    }

    #[test]
    fn full_overlap_scores_high() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score(
            "Stay at The Ritz London.",
            "The Ritz London",
            "The Ritz London",
            "london_travel",
        );
        // 0.4 * 1 + 0.3 * 2/3 + 0.2 * 1.0 + 0.1 * 2/3
        assert!((score - (0.4 + 0.2 + 0.2 + 0.2 / 3.0)).abs() < 1e-12);
        assert!(score > 0.8);
    }

    #[test]
    fn unknown_category_uses_default_weight() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score("", "", "", "no_such_category");
        assert!((score - 0.2 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn scorer_uses_injected_category_table() {
        let weights = CategoryWeights::new(
            [("museums".to_string(), 1.0)].into_iter().collect(),
            0.0,
        );
        let scorer = RelevanceScorer::new(weights);
        assert!((scorer.score("", "", "", "museums") - 0.2).abs() < 1e-12);
        assert_eq!(scorer.score("", "", "", "london_travel"), 0.0);
    }

    #[test]
    fn identical_everything_reaches_exactly_one() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score("Savoy Hotel", "Savoy Hotel", "Savoy Hotel", "london_travel");
        assert!(score <= 1.0);
        assert!((score - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn score_is_bounded_and_deterministic(
            content in "[a-z .!?]{0,120}",
            title in "[a-z ]{0,40}",
            candidate in "[a-z ]{0,40}",
            category in prop_oneof![
                Just("london_travel".to_string()),
                Just("luxury_hotels".to_string()),
                "[a-z_]{0,12}",
            ],
        ) {
            let scorer = RelevanceScorer::default();
            let first = scorer.score(&content, &title, &candidate, &category);
            let second = scorer.score(&content, &title, &candidate, &category);
            prop_assert!((0.0..=1.0).contains(&first));
            prop_assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}
