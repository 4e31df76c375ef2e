//! # interlink-index
//!
//! SQLite storage for interlink.
//!
//! Holds two tables:
//! - `pages`: the catalog of pages that can be linked to
//! - `internal_links`: the ordered link set attached to each source page
//!
//! Link sets are owned per source page and are replaced wholesale;
//! individual links are never patched in place.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use tracing::debug;

use interlink_core::error::InterlinkError;
use interlink_core::link::{InternalLink, LinkStatistics};
use interlink_core::page::CandidatePage;

const LINK_COLUMNS: &str = "id, source_id, target_id, anchor_text, context, relevance_score,
                            link_type, position, status, created_at, updated_at";

/// The LinkIndex manages the SQLite database behind the catalog and link store.
pub struct LinkIndex {
    conn: Mutex<Connection>,
}

impl LinkIndex {
    /// Open or create an index database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, InterlinkError> {
        let conn = Connection::open(path).map_err(index_err)?;
        let index = Self {
            conn: Mutex::new(conn),
        };
        index.create_schema()?;
        Ok(index)
    }

    /// Create an in-memory index (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if schema creation fails.
    pub fn in_memory() -> Result<Self, InterlinkError> {
        let conn = Connection::open_in_memory().map_err(index_err)?;
        let index = Self {
            conn: Mutex::new(conn),
        };
        index.create_schema()?;
        Ok(index)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, InterlinkError> {
        self.conn
            .lock()
            .map_err(|_| InterlinkError::Index("index connection lock poisoned".to_string()))
    }

    fn create_schema(&self) -> Result<(), InterlinkError> {
        self.conn()?
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS pages (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                category TEXT NOT NULL,
                quality_score REAL NOT NULL DEFAULT 0.0,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS internal_links (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                anchor_text TEXT NOT NULL,
                context TEXT NOT NULL,
                relevance_score REAL NOT NULL,
                link_type TEXT NOT NULL,
                position TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                ordinal INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pages_category ON pages(category);
            CREATE INDEX IF NOT EXISTS idx_links_source ON internal_links(source_id, ordinal);
            CREATE INDEX IF NOT EXISTS idx_links_target ON internal_links(target_id);
            ",
            )
            .map_err(index_err)?;

        Ok(())
    }

    // === Catalog ===

    /// Insert or replace a catalog page.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the insert fails.
    pub fn upsert_page(&self, page: &CandidatePage) -> Result<(), InterlinkError> {
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO pages (id, title, url, category, quality_score, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    page.id,
                    page.title,
                    page.url,
                    page.category,
                    page.quality_score,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(index_err)?;
        Ok(())
    }

    /// Remove a page from the catalog together with the links it owns.
    ///
    /// Links from other pages that point at it are left for their owners
    /// to drop on their next regeneration.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the delete fails.
    pub fn remove_page(&self, id: &str) -> Result<(), InterlinkError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(index_err)?;
        let dropped_links = tx
            .execute("DELETE FROM internal_links WHERE source_id = ?1", params![id])
            .map_err(index_err)?;
        tx.execute("DELETE FROM pages WHERE id = ?1", params![id])
            .map_err(index_err)?;
        tx.commit().map_err(index_err)?;
        debug!(page_id = id, dropped_links, "page removed");
        Ok(())
    }

    /// Look up a single catalog page.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the query fails.
    pub fn get_page(&self, id: &str) -> Result<Option<CandidatePage>, InterlinkError> {
        self.conn()?
            .query_row(
                "SELECT id, title, url, category, quality_score FROM pages WHERE id = ?1",
                params![id],
                page_from_row,
            )
            .optional()
            .map_err(index_err)
    }

    /// All catalog pages, best quality first.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the query fails.
    pub fn list_pages(&self) -> Result<Vec<CandidatePage>, InterlinkError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, url, category, quality_score
                 FROM pages
                 ORDER BY quality_score DESC, id ASC",
            )
            .map_err(index_err)?;

        let pages = stmt
            .query_map([], page_from_row)
            .map_err(index_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(index_err)?;

        Ok(pages)
    }

    /// Catalog pages that may be linked from `exclude_id`, best quality first.
    ///
    /// With `category` set only that category is returned. The excluded page
    /// never appears and ids are unique by construction of the table.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the query fails.
    pub fn list_candidate_pages(
        &self,
        category: Option<&str>,
        exclude_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidatePage>, InterlinkError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, url, category, quality_score
                 FROM pages
                 WHERE id != ?1 AND (?2 IS NULL OR category = ?2)
                 ORDER BY quality_score DESC, id ASC
                 LIMIT ?3",
            )
            .map_err(index_err)?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let pages = stmt
            .query_map(params![exclude_id, category, limit], page_from_row)
            .map_err(index_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(index_err)?;

        Ok(pages)
    }

    /// Get count of catalog pages.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the query fails.
    pub fn count_pages(&self) -> Result<u64, InterlinkError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .map_err(index_err)?;
        Ok(count as u64)
    }

    // === Links ===

    /// Links owned by `source_id`, in the order they were stored.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the query fails or a stored row is malformed.
    pub fn links_for(&self, source_id: &str) -> Result<Vec<InternalLink>, InterlinkError> {
        self.query_links(
            &format!(
                "SELECT {LINK_COLUMNS} FROM internal_links
                 WHERE source_id = ?1
                 ORDER BY ordinal ASC"
            ),
            source_id,
        )
    }

    /// Links on any page that point at `target_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the query fails or a stored row is malformed.
    pub fn links_to(&self, target_id: &str) -> Result<Vec<InternalLink>, InterlinkError> {
        self.query_links(
            &format!(
                "SELECT {LINK_COLUMNS} FROM internal_links
                 WHERE target_id = ?1
                 ORDER BY relevance_score DESC, source_id ASC"
            ),
            target_id,
        )
    }

    fn query_links(&self, sql: &str, key: &str) -> Result<Vec<InternalLink>, InterlinkError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(index_err)?;

        let rows = stmt
            .query_map(params![key], |row| {
                Ok(LinkRow {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    target_id: row.get(2)?,
                    anchor_text: row.get(3)?,
                    context: row.get(4)?,
                    relevance_score: row.get(5)?,
                    link_type: row.get(6)?,
                    position: row.get(7)?,
                    status: row.get(8)?,
                    created_at: row.get(9)?,
                    updated_at: row.get(10)?,
                })
            })
            .map_err(index_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(index_err)?;

        rows.into_iter().map(LinkRow::into_link).collect()
    }

    /// Replace the whole link set of `source_id` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if any statement fails; the previous
    /// link set is kept in that case.
    pub fn replace_links(
        &self,
        source_id: &str,
        links: &[InternalLink],
    ) -> Result<(), InterlinkError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(index_err)?;
        tx.execute(
            "DELETE FROM internal_links WHERE source_id = ?1",
            params![source_id],
        )
        .map_err(index_err)?;
        for (ordinal, link) in links.iter().enumerate() {
            insert_link(&tx, source_id, link, ordinal as i64)?;
        }
        tx.commit().map_err(index_err)?;
        debug!(source_id, links = links.len(), "link set replaced");
        Ok(())
    }

    /// Drop every link owned by `source_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the delete fails.
    pub fn clear_links(&self, source_id: &str) -> Result<(), InterlinkError> {
        self.replace_links(source_id, &[])
    }

    /// Whether a link with this id is stored on any page.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if the query fails.
    pub fn link_exists(&self, id: &str) -> Result<bool, InterlinkError> {
        let found: Option<i64> = self
            .conn()?
            .query_row(
                "SELECT 1 FROM internal_links WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(index_err)?;
        Ok(found.is_some())
    }

    /// Totals over every stored link.
    ///
    /// # Errors
    ///
    /// Returns [`InterlinkError::Index`] if a query fails.
    pub fn link_statistics(&self) -> Result<LinkStatistics, InterlinkError> {
        let conn = self.conn()?;

        let (total, average): (i64, f64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(AVG(relevance_score), 0.0) FROM internal_links",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(index_err)?;

        Ok(LinkStatistics {
            total_links: total as u64,
            counts_by_type: group_counts(&conn, "link_type")?,
            counts_by_position: group_counts(&conn, "position")?,
            average_relevance_score: average,
        })
    }
}

fn index_err(e: rusqlite::Error) -> InterlinkError {
    InterlinkError::Index(e.to_string())
}

fn page_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CandidatePage> {
    Ok(CandidatePage {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        category: row.get(3)?,
        quality_score: row.get(4)?,
    })
}

fn insert_link(
    tx: &Transaction<'_>,
    source_id: &str,
    link: &InternalLink,
    ordinal: i64,
) -> Result<(), InterlinkError> {
    tx.execute(
        "INSERT INTO internal_links
        (id, source_id, target_id, anchor_text, context, relevance_score,
         link_type, position, status, ordinal, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            link.id,
            source_id,
            link.target_id,
            link.anchor_text,
            link.context,
            link.relevance_score,
            link.link_type.as_str(),
            link.position.as_str(),
            link.status.as_str(),
            ordinal,
            link.created_at.to_rfc3339(),
            link.updated_at.to_rfc3339(),
        ],
    )
    .map_err(index_err)?;
    Ok(())
}

/// Column is interpolated into SQL: callers pass fixed column names only.
fn group_counts(conn: &Connection, column: &str) -> Result<BTreeMap<String, u64>, InterlinkError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {column}, COUNT(*) FROM internal_links GROUP BY {column}"
        ))
        .map_err(index_err)?;

    let counts = stmt
        .query_map([], |row| {
            let key: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((key, count as u64))
        })
        .map_err(index_err)?
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()
        .map_err(index_err)?;

    Ok(counts)
}

/// A link row as stored, before enum and timestamp decoding.
struct LinkRow {
    id: String,
    source_id: String,
    target_id: String,
    anchor_text: String,
    context: String,
    relevance_score: f64,
    link_type: String,
    position: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl LinkRow {
    fn into_link(self) -> Result<InternalLink, InterlinkError> {
        Ok(InternalLink {
            link_type: self.link_type.parse().map_err(InterlinkError::Index)?,
            position: self.position.parse().map_err(InterlinkError::Index)?,
            status: self.status.parse().map_err(InterlinkError::Index)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            source_id: self.source_id,
            target_id: self.target_id,
            anchor_text: self.anchor_text,
            context: self.context,
            relevance_score: self.relevance_score,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, InterlinkError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| InterlinkError::Index(format!("bad timestamp '{raw}': {e}")))
}
