//! Opportunity ranking: threshold, order, cap, and classify.

use interlink_core::config::EngineConfig;
use interlink_core::link::{LinkOpportunity, LinkPosition, LinkType};
use interlink_core::page::{CandidatePage, SourcePage};

/// A candidate that has been scored and given a context sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub target: CandidatePage,
    pub relevance_score: f64,
    pub context: String,
}

/// Classification thresholds used by the ranker.
///
/// With the default minimum score of 0.6 the `breadcrumb` type and the
/// `footer` position cannot be reached; they only apply when the
/// thresholds are configured below their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RankerOpts {
    pub max_links: usize,
    pub min_score: f64,
    pub contextual_threshold: f64,
    pub authority_quality: f64,
    pub related_threshold: f64,
    pub inline_threshold: f64,
    pub sidebar_threshold: f64,
    pub related_position_threshold: f64,
}

impl Default for RankerOpts {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for RankerOpts {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_links: config.max_links_per_page,
            min_score: config.min_relevance_score,
            contextual_threshold: config.contextual_threshold,
            authority_quality: config.authority_quality,
            related_threshold: config.related_threshold,
            inline_threshold: config.inline_threshold,
            sidebar_threshold: config.sidebar_threshold,
            related_position_threshold: config.related_position_threshold,
        }
    }
}

/// Turns scored candidates into a bounded, ordered list of opportunities.
#[derive(Debug, Clone, Default)]
pub struct OpportunityRanker {
    opts: RankerOpts,
}

impl OpportunityRanker {
    #[must_use]
    pub fn new(opts: RankerOpts) -> Self {
        Self { opts }
    }

    /// Keep candidates scoring at least `min_score`, best first, at most
    /// `max_links` of them. Equal scores keep their input order.
    #[must_use]
    pub fn rank(&self, source: &SourcePage, candidates: Vec<ScoredCandidate>) -> Vec<LinkOpportunity> {
        let mut kept: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|c| c.relevance_score >= self.opts.min_score)
            .collect();

        // sort_by is stable
        kept.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        kept.truncate(self.opts.max_links);

        kept.into_iter()
            .map(|candidate| LinkOpportunity {
                source_page: source.clone(),
                anchor_text: select_anchor_text(&candidate.target.title),
                link_type: self.link_type(candidate.relevance_score, candidate.target.quality_score),
                position: self.position(candidate.relevance_score),
                context: candidate.context,
                relevance_score: candidate.relevance_score,
                target_page: candidate.target,
            })
            .collect()
    }

    #[must_use]
    pub fn link_type(&self, score: f64, target_quality: f64) -> LinkType {
        if score >= self.opts.contextual_threshold {
            LinkType::Contextual
        } else if target_quality >= self.opts.authority_quality {
            LinkType::Authority
        } else if score >= self.opts.related_threshold {
            LinkType::Related
        } else {
            LinkType::Breadcrumb
        }
    }

    #[must_use]
    pub fn position(&self, score: f64) -> LinkPosition {
        if score >= self.opts.inline_threshold {
            LinkPosition::Inline
        } else if score >= self.opts.sidebar_threshold {
            LinkPosition::Sidebar
        } else if score >= self.opts.related_position_threshold {
            LinkPosition::Related
        } else {
            LinkPosition::Footer
        }
    }
}

/// Anchor text for a target title.
///
/// Titles of up to three words are used whole. Longer titles are cut to
/// the shortest (by characters) of three windows: the first three words,
/// words two to four, and the last three words. The earlier window wins ties.
#[must_use]
pub fn select_anchor_text(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() <= 3 {
        return title.trim().to_string();
    }

    let windows = [&words[0..3], &words[1..4], &words[words.len() - 3..]];
    let mut best = windows[0].join(" ");
    for window in &windows[1..] {
        let candidate = window.join(" ");
        if candidate.chars().count() < best.chars().count() {
            best = candidate;
        }
    }
    best
}
