//! Page types: the page being processed and the pages it may link to.

use serde::{Deserialize, Serialize};

/// Identity of the page links are generated for.
///
/// Content is passed to the engine separately; only the fields the
/// scoring actually reads are carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePage {
    pub id: String,
    pub title: String,
    /// Used to pick same-category candidates first. Scoring uses the
    /// candidate's category, never this one.
    pub category: String,
}

impl SourcePage {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
        }
    }
}

/// A catalog entry that may become a link target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePage {
    pub id: String,
    pub title: String,
    pub url: String,
    pub category: String,
    /// Externally supplied SEO strength of the page, 0 to 100.
    pub quality_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_page_json_uses_snake_case_fields() {
        let page = CandidatePage {
            id: "ritz".to_string(),
            title: "The Ritz London".to_string(),
            url: "/hotels/ritz".to_string(),
            category: "luxury_hotels".to_string(),
            quality_score: 85.0,
        };

        let json = serde_json::to_value(&page).expect("serialize");
        assert_eq!(json["quality_score"], 85.0);
        assert_eq!(json["category"], "luxury_hotels");
    }
}
