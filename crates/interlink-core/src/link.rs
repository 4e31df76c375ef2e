//! Link types: opportunities, committed internal links, and aggregates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::{CandidatePage, SourcePage};

/// Purpose of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Contextual,
    Related,
    Authority,
    Breadcrumb,
}

/// Where on the page a link is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPosition {
    Inline,
    Sidebar,
    Footer,
    Related,
}

/// Lifecycle state of a persisted link. Generation only produces `Active`;
/// the other states belong to manual curation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($ty::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($ty))),
                }
            }
        }
    };
}

str_enum!(LinkType {
    Contextual => "contextual",
    Related => "related",
    Authority => "authority",
    Breadcrumb => "breadcrumb",
});

str_enum!(LinkPosition {
    Inline => "inline",
    Sidebar => "sidebar",
    Footer => "footer",
    Related => "related",
});

str_enum!(LinkStatus {
    Active => "active",
    Inactive => "inactive",
    Archived => "archived",
});

/// A scored and contextualized candidate link that has not been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkOpportunity {
    pub source_page: SourcePage,
    pub target_page: CandidatePage,
    pub anchor_text: String,
    /// The source sentence the link sits next to.
    pub context: String,
    pub relevance_score: f64,
    pub link_type: LinkType,
    pub position: LinkPosition,
}

/// A committed link from one page to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalLink {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub anchor_text: String,
    pub context: String,
    pub relevance_score: f64,
    pub link_type: LinkType,
    pub position: LinkPosition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub status: LinkStatus,
}

/// Aggregate counts over every stored link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkStatistics {
    pub total_links: u64,
    pub counts_by_type: BTreeMap<String, u64>,
    pub counts_by_position: BTreeMap<String, u64>,
    /// Zero when no links are stored.
    pub average_relevance_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_enums_serialize_lowercase() {
        let json = serde_json::to_string(&LinkType::Contextual).expect("serialize");
        assert_eq!(json, "\"contextual\"");
        let json = serde_json::to_string(&LinkPosition::Sidebar).expect("serialize");
        assert_eq!(json, "\"sidebar\"");
    }

    #[test]
    fn link_enums_parse_their_display_form() {
        for ty in [
            LinkType::Contextual,
            LinkType::Related,
            LinkType::Authority,
            LinkType::Breadcrumb,
        ] {
            assert_eq!(ty.to_string().parse::<LinkType>().unwrap(), ty);
        }
        assert_eq!("footer".parse::<LinkPosition>().unwrap(), LinkPosition::Footer);
        assert!("pinned".parse::<LinkStatus>().is_err());
    }

    #[test]
    fn internal_link_status_defaults_to_active() {
        let json = serde_json::json!({
            "id": "link_1_abc",
            "source_id": "a",
            "target_id": "b",
            "anchor_text": "The Ritz",
            "context": "Stay at The Ritz.",
            "relevance_score": 0.8,
            "link_type": "contextual",
            "position": "inline",
            "created_at": "2025-02-10T00:00:00Z",
            "updated_at": "2025-02-10T00:00:00Z"
        });

        let link: InternalLink = serde_json::from_value(json).expect("deserialize");
        assert_eq!(link.status, LinkStatus::Active);
        assert_eq!(link.link_type, LinkType::Contextual);
    }
}
