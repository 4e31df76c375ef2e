//! The linking engine facade.
//!
//! One generation run for a page:
//! 1. collect candidates from the catalog (excluding the page itself)
//! 2. score each candidate and find a context sentence for it
//! 3. rank: threshold, stable sort, cap, classify
//! 4. build links and replace the page's stored set in one write
//!
//! Runs for the same page are serialized; runs for different pages are not.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, info_span, warn, Instrument};

use interlink_core::config::EngineConfig;
use interlink_core::error::Result;
use interlink_core::link::{InternalLink, LinkOpportunity, LinkStatistics};
use interlink_core::page::{CandidatePage, SourcePage};

use crate::collector::CandidateCollector;
use crate::context::{ContextLocator, ContextOpts};
use crate::materializer::LinkMaterializer;
use crate::ranker::{OpportunityRanker, RankerOpts, ScoredCandidate};
use crate::scorer::RelevanceScorer;
use crate::store::{LinkRegistry, PageCatalog};

/// Outcome of a generate or update run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    /// False when any error was recorded.
    pub success: bool,
    pub links_created: usize,
    /// Links that were stored, best first.
    pub links: Vec<InternalLink>,
    /// Every ranked opportunity, including ones whose write failed.
    pub opportunities: Vec<LinkOpportunity>,
    pub errors: Vec<String>,
}

impl GenerationReport {
    fn empty() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            errors: vec![message],
            ..Self::default()
        }
    }
}

/// Lazily created async mutex per page id.
#[derive(Default)]
struct PageLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl PageLocks {
    /// Locks with no holder or waiter are dropped once the map grows past this.
    const PRUNE_AT: usize = 1024;

    async fn acquire(&self, page_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() >= Self::PRUNE_AT {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(page_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Generates, stores, and reports internal links.
pub struct LinkingEngine {
    catalog: Arc<dyn PageCatalog>,
    registry: Arc<dyn LinkRegistry>,
    config: EngineConfig,
    scorer: RelevanceScorer,
    locator: ContextLocator,
    ranker: OpportunityRanker,
    page_locks: PageLocks,
}

impl LinkingEngine {
    /// Build an engine over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Config`](interlink_core::InterlinkError::Config)
    /// if `config` does not validate.
    pub fn new(
        catalog: Arc<dyn PageCatalog>,
        registry: Arc<dyn LinkRegistry>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let scorer = RelevanceScorer::new(config.category_weights.clone())
            .with_keyword_limit(config.keyword_limit);
        let locator = ContextLocator::new(ContextOpts {
            min_overlap: config.min_context_overlap,
            keyword_limit: config.keyword_limit,
        });
        let ranker = OpportunityRanker::new(RankerOpts::from(&config));

        Ok(Self {
            catalog,
            registry,
            config,
            scorer,
            locator,
            ranker,
            page_locks: PageLocks::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate links for `source` and store them in place of its current set.
    ///
    /// When nothing qualifies the stored set is left as is. Never fails:
    /// problems are reported through [`GenerationReport::errors`].
    pub async fn generate_internal_links(&self, source: &SourcePage, content: &str) -> GenerationReport {
        let span = info_span!("generate_internal_links", page_id = %source.id);
        async {
            let _guard = self.page_locks.acquire(&source.id).await;
            self.generate_locked(source, content).await
        }
        .instrument(span)
        .await
    }

    /// Clear the stored links of `source`, then generate afresh.
    pub async fn update_internal_links(&self, source: &SourcePage, content: &str) -> GenerationReport {
        let span = info_span!("update_internal_links", page_id = %source.id);
        async {
            let _guard = self.page_locks.acquire(&source.id).await;
            if let Err(e) = self.registry.clear_links(&source.id).await {
                warn!(error = %e, "failed to clear existing links");
                return GenerationReport::failure(format!("Failed to clear existing links: {e}"));
            }
            self.generate_locked(source, content).await
        }
        .instrument(span)
        .await
    }

    /// Ranked opportunities for `source` without storing anything.
    pub async fn preview_opportunities(&self, source: &SourcePage, content: &str) -> Vec<LinkOpportunity> {
        let candidates = self.collector().collect(source).await;
        self.plan_opportunities(source, content, candidates)
    }

    /// Score, contextualize, and rank `candidates` against `source`.
    ///
    /// Pure: no I/O, same output for the same input.
    #[must_use]
    pub fn plan_opportunities(
        &self,
        source: &SourcePage,
        content: &str,
        candidates: Vec<CandidatePage>,
    ) -> Vec<LinkOpportunity> {
        let profile = self.scorer.profile(content, &source.title);

        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter_map(|target| {
                let relevance_score =
                    self.scorer
                        .score_profile(&profile, &target.title, &target.category);
                let Some(found) = self.locator.find_context(content, &target.title) else {
                    debug!(candidate = %target.id, relevance_score, "no context sentence, skipped");
                    return None;
                };
                debug!(candidate = %target.id, relevance_score, sentence = found.index, "scored");
                Some(ScoredCandidate {
                    target,
                    relevance_score,
                    context: found.sentence,
                })
            })
            .collect();

        self.ranker.rank(source, scored)
    }

    /// Stored links of `page_id`; empty when there are none or the lookup fails.
    pub async fn get_internal_links(&self, page_id: &str) -> Vec<InternalLink> {
        self.registry.get_links(page_id).await.unwrap_or_else(|e| {
            warn!(page_id, error = %e, "failed to read links");
            Vec::new()
        })
    }

    /// Links on other pages that point at `page_id`; empty on failure.
    pub async fn get_backlinks(&self, page_id: &str) -> Vec<InternalLink> {
        self.registry.get_backlinks(page_id).await.unwrap_or_else(|e| {
            warn!(page_id, error = %e, "failed to read backlinks");
            Vec::new()
        })
    }

    /// Totals over all stored links; zeroed on failure.
    pub async fn get_link_statistics(&self) -> LinkStatistics {
        self.registry.aggregate_statistics().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to aggregate link statistics");
            LinkStatistics::default()
        })
    }

    fn collector(&self) -> CandidateCollector<'_> {
        CandidateCollector::new(self.catalog.as_ref(), self.config.max_candidates)
    }

    async fn generate_locked(&self, source: &SourcePage, content: &str) -> GenerationReport {
        let candidates = self.collector().collect(source).await;
        if candidates.is_empty() {
            info!("no candidate pages");
            return GenerationReport::empty();
        }

        let opportunities = self.plan_opportunities(source, content, candidates);
        if opportunities.is_empty() {
            info!("no link opportunities above threshold");
            return GenerationReport::empty();
        }

        let materializer = LinkMaterializer::new(self.registry.as_ref());
        let mut links = Vec::with_capacity(opportunities.len());
        let mut errors = Vec::new();

        for opportunity in &opportunities {
            match materializer.materialize(opportunity, &source.id).await {
                Ok(link) => links.push(link),
                Err(e) => {
                    warn!(candidate = %opportunity.target_page.id, error = %e, "failed to build link");
                    errors.push(format!(
                        "Failed to create link to {}: {e}",
                        opportunity.target_page.id
                    ));
                }
            }
        }

        // Nothing to store: keep whatever the page had.
        if !links.is_empty() {
            if let Err(e) = self.registry.replace_links(&source.id, &links).await {
                warn!(error = %e, "failed to replace existing links");
                return GenerationReport::failure(format!("Failed to replace existing links: {e}"));
            }
        }

        info!(
            links_created = links.len(),
            opportunities = opportunities.len(),
            errors = errors.len(),
            "internal links generated"
        );

        GenerationReport {
            success: errors.is_empty(),
            links_created: links.len(),
            links,
            opportunities,
            errors,
        }
    }
}
