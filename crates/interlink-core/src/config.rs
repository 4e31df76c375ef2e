//! Engine configuration and the category weight table.
//!
//! Every field has a default, so an empty TOML file is a valid config:
//!
//! ```toml
//! max_links_per_page = 5
//! min_relevance_score = 0.6
//!
//! [category_weights]
//! default_weight = 0.5
//!
//! [category_weights.weights]
//! london_travel = 1.0
//! luxury_hotels = 0.9
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Category weights shipped with the engine.
pub const DEFAULT_CATEGORY_WEIGHTS: &[(&str, f64)] = &[
    ("london_travel", 1.0),
    ("luxury_hotels", 0.9),
    ("fine_dining", 0.8),
    ("attractions", 0.8),
    ("shopping", 0.7),
    ("nightlife", 0.7),
    ("events", 0.6),
    ("transport", 0.6),
];

/// Immutable lookup from category name to relevance weight in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub weights: BTreeMap<String, f64>,
    /// Weight for categories missing from the table.
    pub default_weight: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            weights: DEFAULT_CATEGORY_WEIGHTS
                .iter()
                .map(|(name, weight)| ((*name).to_string(), *weight))
                .collect(),
            default_weight: 0.5,
        }
    }
}

impl CategoryWeights {
    #[must_use]
    pub fn new(weights: BTreeMap<String, f64>, default_weight: f64) -> Self {
        Self {
            weights,
            default_weight,
        }
    }

    /// Weight for `category`, falling back to the default weight.
    #[must_use]
    pub fn weight(&self, category: &str) -> f64 {
        self.weights
            .get(category)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

/// Thresholds and limits used by the linking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on links stored per page.
    pub max_links_per_page: usize,
    /// Opportunities scoring below this are dropped.
    pub min_relevance_score: f64,
    /// Upper bound on candidates pulled from the catalog.
    pub max_candidates: usize,
    /// A context sentence must overlap the target title by strictly more than this.
    pub min_context_overlap: f64,
    /// Number of keywords kept by keyword extraction.
    pub keyword_limit: usize,

    pub contextual_threshold: f64,
    /// Target quality (0 to 100) at which a link becomes `authority`.
    pub authority_quality: f64,
    pub related_threshold: f64,

    pub inline_threshold: f64,
    pub sidebar_threshold: f64,
    pub related_position_threshold: f64,

    pub category_weights: CategoryWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_links_per_page: 5,
            min_relevance_score: 0.6,
            max_candidates: 20,
            min_context_overlap: 0.1,
            keyword_limit: 20,
            contextual_threshold: 0.8,
            authority_quality: 80.0,
            related_threshold: 0.6,
            inline_threshold: 0.8,
            sidebar_threshold: 0.6,
            related_position_threshold: 0.4,
            category_weights: CategoryWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed TOML and any
    /// validation error from [`EngineConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Check that limits are positive and scores lie in [0, 1].
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_links_per_page == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_links_per_page".to_string(),
            });
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_candidates".to_string(),
            });
        }
        if self.keyword_limit == 0 {
            return Err(ConfigError::NotPositive {
                field: "keyword_limit".to_string(),
            });
        }

        let unit_fields = [
            ("min_relevance_score", self.min_relevance_score),
            ("min_context_overlap", self.min_context_overlap),
            ("contextual_threshold", self.contextual_threshold),
            ("related_threshold", self.related_threshold),
            ("inline_threshold", self.inline_threshold),
            ("sidebar_threshold", self.sidebar_threshold),
            ("related_position_threshold", self.related_position_threshold),
            ("category_weights.default_weight", self.category_weights.default_weight),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(0.0..=100.0).contains(&self.authority_quality) {
            return Err(ConfigError::ParseError(format!(
                "authority_quality must be within [0, 100], got {}",
                self.authority_quality
            )));
        }

        for (category, &value) in &self.category_weights.weights {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidCategoryWeight {
                    category: category.clone(),
                    value,
                });
            }
        }

        Ok(())
    }
}
