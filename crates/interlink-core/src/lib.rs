//! # interlink-core
//!
//! Core types, configuration, and error hierarchy for the interlink
//! internal-linking engine.
//!
//! This crate defines the foundational types used across all other interlink crates:
//! - [`SourcePage`] and [`CandidatePage`]: the page being linked from and
//!   the pages that may be linked to
//! - [`LinkOpportunity`]: a scored, contextualized link before it is persisted
//! - [`InternalLink`]: a committed link record
//! - [`LinkStatistics`]: cross-page aggregates
//! - [`EngineConfig`] and [`CategoryWeights`]: thresholds and the category table
//! - Error hierarchy ([`InterlinkError`], [`ConfigError`])

pub mod config;
pub mod error;
pub mod link;
pub mod page;

pub use config::{CategoryWeights, EngineConfig};
pub use error::{ConfigError, InterlinkError, Result};
pub use link::{
    InternalLink, LinkOpportunity, LinkPosition, LinkStatistics, LinkStatus, LinkType,
};
pub use page::{CandidatePage, SourcePage};
