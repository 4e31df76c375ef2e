//! Context locator: picks the source sentence a link should sit next to.

use serde::Serialize;

use crate::analyzer::{jaccard_similarity, keyword_set, split_sentences, DEFAULT_KEYWORD_LIMIT};

/// Options for context location.
#[derive(Debug, Clone)]
pub struct ContextOpts {
    /// A sentence must overlap the candidate title by strictly more than this.
    pub min_overlap: f64,
    /// Keywords kept per sentence and per title.
    pub keyword_limit: usize,
}

impl Default for ContextOpts {
    fn default() -> Self {
        Self {
            min_overlap: 0.1,
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }
}

/// The sentence chosen as link context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextMatch {
    pub sentence: String,
    /// Position among the non-blank sentences of the content.
    pub index: usize,
    pub overlap: f64,
}

/// Finds the best context sentence for a candidate title.
#[derive(Debug, Clone, Default)]
pub struct ContextLocator {
    opts: ContextOpts,
}

impl ContextLocator {
    #[must_use]
    pub fn new(opts: ContextOpts) -> Self {
        Self { opts }
    }

    /// The sentence whose keywords overlap `candidate_title` the most.
    ///
    /// The earliest sentence wins ties. Returns `None` when no sentence
    /// beats the minimum overlap, in which case no link is produced.
    #[must_use]
    pub fn find_context(&self, source_content: &str, candidate_title: &str) -> Option<ContextMatch> {
        let title_keywords = keyword_set(candidate_title, self.opts.keyword_limit);

        let mut best: Option<ContextMatch> = None;
        let mut best_overlap = 0.0;

        for (index, sentence) in split_sentences(source_content).into_iter().enumerate() {
            let overlap = jaccard_similarity(
                &keyword_set(sentence, self.opts.keyword_limit),
                &title_keywords,
            );
            if overlap > best_overlap {
                best_overlap = overlap;
                best = Some(ContextMatch {
                    sentence: sentence.to_string(),
                    index,
                    overlap,
                });
            }
        }

        best.filter(|m| m.overlap > self.opts.min_overlap)
    }
}
