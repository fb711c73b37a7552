//! Coarse site categories derived from a domain.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of site a domain belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteCategory {
    Social,
    Video,
    Shopping,
    Banking,
    News,
    Mail,
    Forum,
    Search,
    Education,
    Streaming,
    Webapp,
    Other,
}

impl SiteCategory {
    pub const ALL: [SiteCategory; 12] = [
        SiteCategory::Social,
        SiteCategory::Video,
        SiteCategory::Shopping,
        SiteCategory::Banking,
        SiteCategory::News,
        SiteCategory::Mail,
        SiteCategory::Forum,
        SiteCategory::Search,
        SiteCategory::Education,
        SiteCategory::Streaming,
        SiteCategory::Webapp,
        SiteCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SiteCategory::Social => "social",
            SiteCategory::Video => "video",
            SiteCategory::Shopping => "shopping",
            SiteCategory::Banking => "banking",
            SiteCategory::News => "news",
            SiteCategory::Mail => "mail",
            SiteCategory::Forum => "forum",
            SiteCategory::Search => "search",
            SiteCategory::Education => "education",
            SiteCategory::Streaming => "streaming",
            SiteCategory::Webapp => "webapp",
            SiteCategory::Other => "other",
        }
    }
}

impl fmt::Display for SiteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
