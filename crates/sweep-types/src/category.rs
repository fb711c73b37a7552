//! Browser data categories and their removal capabilities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A kind of site data the browser holds and can remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataCategory {
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "cookies")]
    Cookies,
    #[serde(rename = "localStorage")]
    LocalStorage,
    #[serde(rename = "sessionStorage")]
    SessionStorage,
    #[serde(rename = "indexedDB")]
    IndexedDb,
    #[serde(rename = "webSQL")]
    WebSql,
    #[serde(rename = "formData")]
    FormData,
    #[serde(rename = "fileSystem")]
    FileSystem,
    #[serde(rename = "serviceWorkers")]
    ServiceWorkers,
}

impl DataCategory {
    /// Every category, in declaration order.
    pub const ALL: [DataCategory; 9] = [
        DataCategory::Cache,
        DataCategory::Cookies,
        DataCategory::LocalStorage,
        DataCategory::SessionStorage,
        DataCategory::IndexedDb,
        DataCategory::WebSql,
        DataCategory::FormData,
        DataCategory::FileSystem,
        DataCategory::ServiceWorkers,
    ];

    /// The wire tag of this category.
    pub fn as_str(self) -> &'static str {
        match self {
            DataCategory::Cache => "cache",
            DataCategory::Cookies => "cookies",
            DataCategory::LocalStorage => "localStorage",
            DataCategory::SessionStorage => "sessionStorage",
            DataCategory::IndexedDb => "indexedDB",
            DataCategory::WebSql => "webSQL",
            DataCategory::FormData => "formData",
            DataCategory::FileSystem => "fileSystem",
            DataCategory::ServiceWorkers => "serviceWorkers",
        }
    }

    /// Human-readable label used in advice text.
    pub fn label(self) -> &'static str {
        match self {
            DataCategory::Cache => "Cache",
            DataCategory::Cookies => "Cookies",
            DataCategory::LocalStorage => "Local Storage",
            DataCategory::SessionStorage => "Session Storage",
            DataCategory::IndexedDb => "IndexedDB",
            DataCategory::WebSql => "WebSQL",
            DataCategory::FormData => "Form Data",
            DataCategory::FileSystem => "File System",
            DataCategory::ServiceWorkers => "Service Workers",
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category tag outside the fixed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for DataCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// How the removal API can scope a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCapability {
    /// The removal API can restrict this category to a set of origins.
    /// When false the category is cleared browser-wide.
    pub origin_scoped: bool,
    /// The removal API has no real key for this category; it is left out of
    /// removal calls.
    pub requires_custom_handling: bool,
    /// Flag name sent to the removal API.
    pub removal_key: &'static str,
}
