//! # interlink-engine
//!
//! The linking engine. Given a page's text and metadata it finds other
//! pages worth linking to, picks anchor text and a context sentence,
//! classifies each link, and persists a bounded, ranked link set.
//!
//! Pipeline, leaf-first:
//! - [`analyzer`]: tokenization, stop words, keyword sets, Jaccard similarity
//! - [`scorer`]: four weighted similarity signals per (source, candidate)
//! - [`context`]: the source sentence most related to a candidate title
//! - [`ranker`]: threshold, stable sort, cap, type/position/anchor selection
//! - [`materializer`]: opportunity to persisted [`InternalLink`](interlink_core::InternalLink)
//! - [`collector`]: candidate gathering, merge and de-duplication
//! - [`store`]: collaborator traits and their SQLite implementations
//! - [`engine`]: the [`LinkingEngine`] facade
//! - [`formatter`]: JSON, table and Markdown output

pub mod analyzer;
pub mod collector;
pub mod context;
pub mod engine;
pub mod formatter;
pub mod materializer;
pub mod ranker;
pub mod scorer;
pub mod store;

pub use engine::{GenerationReport, LinkingEngine};
pub use formatter::{format_links, format_opportunities, format_report, OutputFormat};
pub use scorer::RelevanceScorer;
pub use store::{LinkRegistry, PageCatalog};
