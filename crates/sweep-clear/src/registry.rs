//! Per-category scoping capabilities.
//!
//! | Category | origin-scoped | custom handling | removal key |
//! |---|---|---|---|
//! | cache | yes | no | `cache` |
//! | cookies | yes | no | `cookies` |
//! | localStorage | yes | no | `localStorage` |
//! | sessionStorage | yes | yes | `sessionStorage` (never sent) |
//! | indexedDB | yes | no | `indexedDB` |
//! | webSQL | yes | no | `webSQL` |
//! | formData | no | no | `formData` |
//! | fileSystem | yes | no | `fileSystems` |
//! | serviceWorkers | yes | no | `serviceWorkers` |

use std::collections::HashMap;

use sweep_types::{CategoryCapability, DataCategory, UnknownCategory};

use crate::api::DataTypeFlags;
use crate::Result;

const fn cap(
    origin_scoped: bool,
    requires_custom_handling: bool,
    removal_key: &'static str,
) -> CategoryCapability {
    CategoryCapability {
        origin_scoped,
        requires_custom_handling,
        removal_key,
    }
}

const BUILTIN: &[(DataCategory, CategoryCapability)] = &[
    (DataCategory::Cache, cap(true, false, "cache")),
    (DataCategory::Cookies, cap(true, false, "cookies")),
    (DataCategory::LocalStorage, cap(true, false, "localStorage")),
    (DataCategory::SessionStorage, cap(true, true, "sessionStorage")),
    (DataCategory::IndexedDb, cap(true, false, "indexedDB")),
    (DataCategory::WebSql, cap(true, false, "webSQL")),
    (DataCategory::FormData, cap(false, false, "formData")),
    (DataCategory::FileSystem, cap(true, false, "fileSystems")),
    (DataCategory::ServiceWorkers, cap(true, false, "serviceWorkers")),
];

/// Immutable lookup table from category to capability.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    entries: HashMap<DataCategory, CategoryCapability>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryRegistry {
    /// The table covering every [`DataCategory`].
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().copied())
    }

    /// A custom table. Categories left out fail lookups with `UnknownCategory`.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (DataCategory, CategoryCapability)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn capability_of(&self, category: DataCategory) -> Result<CategoryCapability> {
        self.entries
            .get(&category)
            .copied()
            .ok_or_else(|| UnknownCategory(category.as_str().to_string()).into())
    }

    /// Stable partition into `(origin_scoped, global)`, each keeping the
    /// caller's order.
    pub fn partition(
        &self,
        categories: &[DataCategory],
    ) -> Result<(Vec<DataCategory>, Vec<DataCategory>)> {
        let mut scoped = Vec::new();
        let mut global = Vec::new();
        for &category in categories {
            if self.capability_of(category)?.origin_scoped {
                scoped.push(category);
            } else {
                global.push(category);
            }
        }
        Ok((scoped, global))
    }

    /// Removal flags for one chunk. Categories needing custom handling are
    /// left out; an empty map means there is nothing to send.
    pub fn removal_flags(&self, chunk: &[DataCategory]) -> Result<DataTypeFlags> {
        let mut flags = DataTypeFlags::new();
        for &category in chunk {
            let capability = self.capability_of(category)?;
            if capability.requires_custom_handling {
                continue;
            }
            flags.insert(capability.removal_key.to_string(), true);
        }
        Ok(flags)
    }
}
