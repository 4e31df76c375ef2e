//! Candidate collection: gathers link targets from the catalog.

use std::collections::HashSet;

use tracing::{debug, warn};

use interlink_core::page::{CandidatePage, SourcePage};

use crate::store::PageCatalog;

/// Collects candidate targets for a source page.
///
/// Same-category pages are requested first, then pages from any category.
/// Same-category pages stay ahead of the rest, each group ordered by
/// quality; duplicates and the source page are dropped and the list is capped.
pub struct CandidateCollector<'a> {
    catalog: &'a dyn PageCatalog,
    max_candidates: usize,
}

impl<'a> CandidateCollector<'a> {
    #[must_use]
    pub fn new(catalog: &'a dyn PageCatalog, max_candidates: usize) -> Self {
        Self {
            catalog,
            max_candidates,
        }
    }

    /// Candidates for `source`. Catalog failures count as zero candidates.
    pub async fn collect(&self, source: &SourcePage) -> Vec<CandidatePage> {
        let same_category = self.fetch(Some(source.category.as_str()), &source.id).await;
        let any_category = self.fetch(None, &source.id).await;

        let merged = merge_candidates(&source.id, [same_category, any_category], self.max_candidates);
        debug!(page_id = %source.id, candidates = merged.len(), "collected candidates");
        merged
    }

    async fn fetch(&self, category: Option<&str>, exclude_id: &str) -> Vec<CandidatePage> {
        match self
            .catalog
            .list_candidate_pages(category, exclude_id, self.max_candidates)
            .await
        {
            Ok(pages) => pages,
            Err(e) => {
                warn!(
                    page_id = %exclude_id,
                    category = category.unwrap_or("*"),
                    error = %e,
                    "candidate lookup failed, continuing without these candidates"
                );
                Vec::new()
            }
        }
    }
}

/// Merge batches in priority order, each stable-sorted by quality descending.
///
/// The first occurrence of an id wins, `source_id` is dropped, and the
/// result is truncated to `limit`.
#[must_use]
pub fn merge_candidates<I>(source_id: &str, batches: I, limit: usize) -> Vec<CandidatePage>
where
    I: IntoIterator<Item = Vec<CandidatePage>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for mut batch in batches {
        batch.sort_by(|a, b| {
            b.quality_score
                .partial_cmp(&a.quality_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.extend(
            batch
                .into_iter()
                .filter(|page| page.id != source_id && seen.insert(page.id.clone())),
        );
        if merged.len() >= limit {
            break;
        }
    }

    merged.truncate(limit);
    merged
}
