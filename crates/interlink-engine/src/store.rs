//! Collaborator seams: the page catalog and the link registry.
//!
//! Both are async because real deployments back them with network or
//! disk I/O. [`LinkIndex`] implements both on top of SQLite.

use async_trait::async_trait;

use interlink_core::error::{InterlinkError, Result};
use interlink_core::link::{InternalLink, LinkStatistics};
use interlink_core::page::CandidatePage;
use interlink_index::LinkIndex;

/// Enumerates pages that may become link targets.
#[async_trait]
pub trait PageCatalog: Send + Sync {
    /// Pages other than `exclude_page_id`, best quality first, unique by id,
    /// at most `limit` of them. `None` means any category.
    async fn list_candidate_pages(
        &self,
        category: Option<&str>,
        exclude_page_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidatePage>>;
}

/// Stores the link set owned by each source page.
#[async_trait]
pub trait LinkRegistry: Send + Sync {
    /// Links of `page_id` in stored order; empty when none are stored.
    async fn get_links(&self, page_id: &str) -> Result<Vec<InternalLink>>;

    /// Overwrite the link set of `page_id`. On failure the previous set is kept.
    async fn replace_links(&self, page_id: &str, links: &[InternalLink]) -> Result<()>;

    async fn clear_links(&self, page_id: &str) -> Result<()> {
        self.replace_links(page_id, &[]).await
    }

    /// Links on other pages pointing at `page_id`.
    async fn get_backlinks(&self, page_id: &str) -> Result<Vec<InternalLink>>;

    async fn link_exists(&self, link_id: &str) -> Result<bool>;

    async fn aggregate_statistics(&self) -> Result<LinkStatistics>;
}

#[async_trait]
impl PageCatalog for LinkIndex {
    async fn list_candidate_pages(
        &self,
        category: Option<&str>,
        exclude_page_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidatePage>> {
        LinkIndex::list_candidate_pages(self, category, exclude_page_id, limit)
            .map_err(|e| InterlinkError::Catalog(e.to_string()))
    }
}

#[async_trait]
impl LinkRegistry for LinkIndex {
    async fn get_links(&self, page_id: &str) -> Result<Vec<InternalLink>> {
        self.links_for(page_id)
    }

    async fn replace_links(&self, page_id: &str, links: &[InternalLink]) -> Result<()> {
        LinkIndex::replace_links(self, page_id, links)
    }

    async fn clear_links(&self, page_id: &str) -> Result<()> {
        LinkIndex::clear_links(self, page_id)
    }

    async fn get_backlinks(&self, page_id: &str) -> Result<Vec<InternalLink>> {
        self.links_to(page_id)
    }

    async fn link_exists(&self, link_id: &str) -> Result<bool> {
        LinkIndex::link_exists(self, link_id)
    }

    async fn aggregate_statistics(&self) -> Result<LinkStatistics> {
        self.link_statistics()
    }
}
