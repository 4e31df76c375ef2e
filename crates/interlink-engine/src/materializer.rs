//! Link materialization: opportunity to [`InternalLink`] with a fresh id.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use interlink_core::error::{InterlinkError, Result};
use interlink_core::link::{InternalLink, LinkOpportunity, LinkStatus};

use crate::store::LinkRegistry;

/// How many fresh ids are tried before giving up on a collision.
const MAX_ID_ATTEMPTS: usize = 3;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a link id of the form `link_<unix-millis>_<9 hex chars>`.
///
/// The suffix hashes the endpoints, the timestamp and a process-wide
/// sequence number, so ids never repeat within one process.
#[must_use]
pub fn generate_link_id(source_id: &str, target_id: &str, now: DateTime<Utc>) -> String {
    let sequence = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(target_id.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(sequence.to_le_bytes());
    let digest = hasher.finalize();

    let hex: String = digest.iter().take(5).map(|byte| format!("{byte:02x}")).collect();

    format!("link_{}_{}", now.timestamp_millis(), &hex[..9])
}

/// Builds links for opportunities, checking ids against a [`LinkRegistry`].
///
/// Nothing is written here; the engine stores the finished set with a
/// single [`LinkRegistry::replace_links`].
pub struct LinkMaterializer<'a> {
    registry: &'a dyn LinkRegistry,
}

impl<'a> LinkMaterializer<'a> {
    #[must_use]
    pub fn new(registry: &'a dyn LinkRegistry) -> Self {
        Self { registry }
    }

    /// Build an active link from `opportunity` owned by `source_page_id`.
    ///
    /// # Errors
    ///
    /// Returns the registry error if the id check fails, and
    /// [`InterlinkError::Registry`] if no unused id could be generated.
    pub async fn materialize(
        &self,
        opportunity: &LinkOpportunity,
        source_page_id: &str,
    ) -> Result<InternalLink> {
        let now = Utc::now();
        let id = self
            .unused_id(source_page_id, &opportunity.target_page.id, now)
            .await?;

        let link = InternalLink {
            id,
            source_id: source_page_id.to_string(),
            target_id: opportunity.target_page.id.clone(),
            anchor_text: opportunity.anchor_text.clone(),
            context: opportunity.context.clone(),
            relevance_score: opportunity.relevance_score,
            link_type: opportunity.link_type,
            position: opportunity.position,
            created_at: now,
            updated_at: now,
            status: LinkStatus::Active,
        };

        debug!(link_id = %link.id, target_id = %link.target_id, "link built");
        Ok(link)
    }

    async fn unused_id(
        &self,
        source_id: &str,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_link_id(source_id, target_id, now);
            if !self.registry.link_exists(&id).await? {
                return Ok(id);
            }
        }
        Err(InterlinkError::Registry(format!(
            "could not generate an unused link id for {source_id} -> {target_id}"
        )))
    }
}
