//! Error types for interlink.

use thiserror::Error;

/// Top-level result type for interlink operations.
pub type Result<T> = std::result::Result<T, InterlinkError>;

/// Top-level error type for interlink.
#[derive(Debug, Error)]
pub enum InterlinkError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The page catalog could not list candidates.
    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("index error: {0}")]
    Index(String),
}

/// Errors related to engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{field}' must be within [0, 1], got {value}")]
    OutOfUnitRange { field: String, value: f64 },

    #[error("'{field}' must be greater than zero")]
    NotPositive { field: String },

    #[error("category weight for '{category}' must be within [0, 1], got {value}")]
    InvalidCategoryWeight { category: String, value: f64 },

    #[error("config parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = ConfigError::OutOfUnitRange {
            field: "min_relevance_score".to_string(),
            value: 1.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("min_relevance_score"));
        assert!(msg.contains("1.5"));

        let err: InterlinkError = ConfigError::NotPositive {
            field: "max_links_per_page".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("config error"));
        assert!(msg.contains("max_links_per_page"));

        let err = InterlinkError::Catalog("index error: database is locked".to_string());
        assert_eq!(err.to_string(), "catalog error: index error: database is locked");
    }
}
