//! Data-category recommendations for a domain.
//!
//! Precedence, highest first; each step replaces the list outright:
//!
//! 1. exact per-domain override;
//! 2. banking sites, which are never recommended for clearing;
//! 3. the complex-web-app heuristic;
//! 4. the per-[`SiteCategory`] table;
//! 5. the default `{cache, serviceWorkers}`.
//!
//! Advice text is rendered from the final list and never changes it.

use std::collections::HashMap;

use serde::Serialize;
use sweep_types::{dedup_categories, DataCategory, SiteCategory};
use tracing::debug;

use crate::classify::SiteClassifier;

use DataCategory::{
    Cache, Cookies, IndexedDb, LocalStorage, ServiceWorkers, SessionStorage,
};

/// Recommended set when nothing more specific applies.
pub const DEFAULT_RECOMMENDATION: &[DataCategory] = &[Cache, ServiceWorkers];

/// Added on top of the default for complex web applications.
const COMPLEX_APP_EXTRAS: &[DataCategory] = &[LocalStorage, IndexedDb, SessionStorage];

const BUILTIN_OVERRIDES: &[(&str, &[DataCategory])] = &[
    ("mail.google.com", &[Cache, ServiceWorkers, IndexedDb, LocalStorage]),
    (
        "docs.google.com",
        &[Cache, ServiceWorkers, IndexedDb, LocalStorage, SessionStorage],
    ),
    ("web.whatsapp.com", &[Cache, ServiceWorkers, IndexedDb]),
    (
        "teams.microsoft.com",
        &[Cache, ServiceWorkers, IndexedDb, LocalStorage, SessionStorage],
    ),
    (
        "outlook.office.com",
        &[Cache, ServiceWorkers, IndexedDb, LocalStorage],
    ),
    ("www.figma.com", &[Cache, IndexedDb, ServiceWorkers]),
];

const BUILTIN_BY_CATEGORY: &[(SiteCategory, &[DataCategory])] = &[
    (SiteCategory::Social, &[Cache, LocalStorage, IndexedDb, ServiceWorkers]),
    (SiteCategory::Video, &[Cache, ServiceWorkers, IndexedDb]),
    (SiteCategory::Shopping, &[Cache, LocalStorage, SessionStorage]),
    (SiteCategory::Banking, &[]),
    (SiteCategory::News, &[Cache, ServiceWorkers]),
    (SiteCategory::Mail, &[Cache, IndexedDb, ServiceWorkers]),
    (SiteCategory::Forum, &[Cache, LocalStorage]),
    (SiteCategory::Search, &[Cache, Cookies]),
    (SiteCategory::Education, &[Cache, LocalStorage, ServiceWorkers]),
    (SiteCategory::Streaming, &[Cache, IndexedDb, ServiceWorkers]),
    (
        SiteCategory::Webapp,
        &[Cache, LocalStorage, IndexedDb, ServiceWorkers],
    ),
    (SiteCategory::Other, &[Cache, ServiceWorkers]),
];

const BUILTIN_ADVICE: &[(SiteCategory, &str)] = &[
    (
        SiteCategory::Social,
        "Social sites keep feeds and media in {types}. Clearing them fixes stale timelines without signing you out.",
    ),
    (
        SiteCategory::Video,
        "Video sites buffer heavily into {types}. Clearing them frees space and fixes stuck playback.",
    ),
    (
        SiteCategory::Shopping,
        "Shopping sites cache listings and carts in {types}. Clearing them refreshes prices and stock.",
    ),
    (
        SiteCategory::Banking,
        "Financial sites are not recommended for clearing. Removing their data can trigger extra security checks.",
    ),
    (
        SiteCategory::News,
        "News sites cache articles in {types}. Clearing them brings in the latest stories.",
    ),
    (
        SiteCategory::Mail,
        "Mail clients keep offline copies in {types}. Clearing them resolves sync problems.",
    ),
    (
        SiteCategory::Forum,
        "Forums remember drafts and view state in {types}. Clearing them resets stale threads.",
    ),
    (
        SiteCategory::Search,
        "Search engines store preferences in {types}. Clearing them resets personalised results.",
    ),
    (
        SiteCategory::Education,
        "Learning platforms store progress caches in {types}. Clearing them fixes outdated course pages.",
    ),
    (
        SiteCategory::Streaming,
        "Streaming services keep large media caches in {types}. Clearing them frees significant space.",
    ),
    (
        SiteCategory::Webapp,
        "Web applications keep state in {types}. Clearing them fixes most loading and update problems.",
    ),
    (
        SiteCategory::Other,
        "Clearing {types} usually fixes display and loading problems on this site.",
    ),
];

const EMPTY_ADVICE: &str = "No data types are recommended for clearing on this site.";

/// Which precedence step produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendationSource {
    Override,
    Banking,
    ComplexWebApp,
    Category,
    Default,
}

/// Ordered, duplicate-free categories plus human-readable advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub site_category: SiteCategory,
    pub source: RecommendationSource,
    pub categories: Vec<DataCategory>,
    pub advice: String,
}

/// Lookup tables driving the engine. Built once and injected.
#[derive(Debug, Clone, Default)]
pub struct RecommendationTables {
    overrides: Vec<(String, Vec<DataCategory>)>,
    by_category: HashMap<SiteCategory, Vec<DataCategory>>,
    advice: HashMap<SiteCategory, String>,
}

impl RecommendationTables {
    pub fn builtin() -> Self {
        Self {
            overrides: BUILTIN_OVERRIDES
                .iter()
                .map(|(domain, cats)| (domain.to_string(), cats.to_vec()))
                .collect(),
            by_category: BUILTIN_BY_CATEGORY
                .iter()
                .map(|(site, cats)| (*site, cats.to_vec()))
                .collect(),
            advice: BUILTIN_ADVICE
                .iter()
                .map(|(site, text)| (*site, text.to_string()))
                .collect(),
        }
    }

    pub fn with_override(mut self, domain: impl Into<String>, categories: Vec<DataCategory>) -> Self {
        self.overrides.push((domain.into(), categories));
        self
    }

    pub fn with_category(mut self, site: SiteCategory, categories: Vec<DataCategory>) -> Self {
        self.by_category.insert(site, categories);
        self
    }

    fn override_for(&self, domain: &str) -> Option<&[DataCategory]> {
        self.overrides
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, cats)| cats.as_slice())
    }
}

pub struct RecommendationEngine {
    classifier: SiteClassifier,
    tables: RecommendationTables,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(SiteClassifier::default(), RecommendationTables::builtin())
    }
}

impl RecommendationEngine {
    pub fn new(classifier: SiteClassifier, tables: RecommendationTables) -> Self {
        Self { classifier, tables }
    }

    pub fn classifier(&self) -> &SiteClassifier {
        &self.classifier
    }

    /// Recommend which categories to clear for `domain`. Never fails.
    pub fn recommend(&self, domain: &str) -> RecommendationSet {
        let site_category = self.classifier.classify(domain);
        let (source, categories) = self.select(domain, site_category);
        let categories = dedup_categories(categories);
        let advice = self.advice(site_category, &categories);

        debug!(
            domain,
            site_category = %site_category,
            ?source,
            count = categories.len(),
            "computed recommendation"
        );

        RecommendationSet {
            site_category,
            source,
            categories,
            advice,
        }
    }

    fn select(
        &self,
        domain: &str,
        site_category: SiteCategory,
    ) -> (RecommendationSource, Vec<DataCategory>) {
        if let Some(cats) = self.tables.override_for(domain) {
            return (RecommendationSource::Override, cats.to_vec());
        }
        if site_category == SiteCategory::Banking {
            return (RecommendationSource::Banking, Vec::new());
        }
        if self.classifier.is_complex_web_app(domain) {
            let cats = DEFAULT_RECOMMENDATION
                .iter()
                .chain(COMPLEX_APP_EXTRAS)
                .copied()
                .collect();
            return (RecommendationSource::ComplexWebApp, cats);
        }
        match self.tables.by_category.get(&site_category) {
            Some(cats) => (RecommendationSource::Category, cats.clone()),
            None => (
                RecommendationSource::Default,
                DEFAULT_RECOMMENDATION.to_vec(),
            ),
        }
    }

    fn advice(&self, site_category: SiteCategory, categories: &[DataCategory]) -> String {
        let template = self.tables.advice.get(&site_category);
        if categories.is_empty() {
            return match template {
                Some(t) if !t.contains("{types}") => t.clone(),
                _ => EMPTY_ADVICE.to_string(),
            };
        }

        let labels = categories
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ");
        match template {
            Some(t) => t.replace("{types}", &labels),
            None => format!("Clearing {labels} is recommended for this site."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::SiteTable;

    fn engine_with_bank() -> RecommendationEngine {
        let table = SiteTable::from_entries([
            ("mybank.com".to_string(), SiteCategory::Banking),
            ("news.com".to_string(), SiteCategory::News),
        ]);
        RecommendationEngine::new(SiteClassifier::new(table), RecommendationTables::builtin())
    }

    #[test]
    fn test_banking_recommends_nothing() {
        let engine = engine_with_bank();
        let rec = engine.recommend("mybank.com");
        assert_eq!(rec.site_category, SiteCategory::Banking);
        assert_eq!(rec.source, RecommendationSource::Banking);
        assert!(rec.categories.is_empty());
        assert!(rec.advice.contains("Financial"));
    }

    #[test]
    fn test_banking_beats_complex_app_heuristic() {
        let engine = engine_with_bank();
        let rec = engine.recommend("account.mybank.com");
        assert_eq!(rec.site_category, SiteCategory::Banking);
        assert!(rec.categories.is_empty());
    }

    #[test]
    fn test_override_beats_banking() {
        let table = SiteTable::from_entries([("mybank.com".to_string(), SiteCategory::Banking)]);
        let tables = RecommendationTables::builtin().with_override("mybank.com", vec![Cache]);
        let engine = RecommendationEngine::new(SiteClassifier::new(table), tables);
        let rec = engine.recommend("mybank.com");
        assert_eq!(rec.source, RecommendationSource::Override);
        assert_eq!(rec.categories, vec![Cache]);
    }

    #[test]
    fn test_override_is_exact_on_raw_domain() {
        let engine = RecommendationEngine::default();
        let rec = engine.recommend("mail.google.com");
        assert_eq!(rec.source, RecommendationSource::Override);
        assert_eq!(rec.categories, vec![Cache, ServiceWorkers, IndexedDb, LocalStorage]);
    }

    #[test]
    fn test_complex_web_app_extends_default() {
        let engine = RecommendationEngine::default();
        let rec = engine.recommend("dashboard.internal-tool.net");
        assert_eq!(rec.source, RecommendationSource::ComplexWebApp);
        assert_eq!(
            rec.categories,
            vec![Cache, ServiceWorkers, LocalStorage, IndexedDb, SessionStorage]
        );
    }

    #[test]
    fn test_complex_app_heuristic_beats_category_table() {
        let engine = RecommendationEngine::default();
        let rec = engine.recommend("apps.facebook.com");
        assert_eq!(rec.site_category, SiteCategory::Social);
        assert_eq!(rec.source, RecommendationSource::ComplexWebApp);
        assert_eq!(
            rec.categories,
            vec![Cache, ServiceWorkers, LocalStorage, IndexedDb, SessionStorage]
        );
    }

    #[test]
    fn test_category_table() {
        let engine = RecommendationEngine::default();
        let rec = engine.recommend("www.youtube.com");
        assert_eq!(rec.site_category, SiteCategory::Video);
        assert_eq!(rec.source, RecommendationSource::Category);
        assert_eq!(rec.categories, vec![Cache, ServiceWorkers, IndexedDb]);
        assert!(rec.advice.contains("Cache, Service Workers, IndexedDB"));
    }

    #[test]
    fn test_missing_category_entry_falls_back_to_default() {
        let table = SiteTable::from_entries([("news.com".to_string(), SiteCategory::News)]);
        let engine = RecommendationEngine::new(
            SiteClassifier::new(table),
            RecommendationTables::default(),
        );
        let rec = engine.recommend("news.com");
        assert_eq!(rec.source, RecommendationSource::Default);
        assert_eq!(rec.categories, DEFAULT_RECOMMENDATION.to_vec());
        assert!(rec.advice.contains("Cache, Service Workers"));
    }

    #[test]
    fn test_duplicates_removed_first_wins() {
        let tables = RecommendationTables::builtin().with_category(
            SiteCategory::Other,
            vec![Cookies, Cache, Cookies, ServiceWorkers, Cache],
        );
        let engine = RecommendationEngine::new(SiteClassifier::default(), tables);
        let rec = engine.recommend("totally-unknown-xyz.example");
        assert_eq!(rec.categories, vec![Cookies, Cache, ServiceWorkers]);
    }

    #[test]
    fn test_empty_override_gets_generic_advice() {
        let tables = RecommendationTables::builtin().with_override("quiet.example", Vec::new());
        let engine = RecommendationEngine::new(SiteClassifier::default(), tables);
        let rec = engine.recommend("quiet.example");
        assert!(rec.categories.is_empty());
        assert_eq!(rec.advice, EMPTY_ADVICE);
    }

    #[test]
    fn test_serializes_camel_case() {
        let rec = RecommendationEngine::default().recommend("www.youtube.com");
        let json = serde_json::to_value(&rec).expect("serialize");
        assert_eq!(json["siteCategory"], "video");
        assert_eq!(json["source"], "category");
        assert_eq!(json["categories"][0], "cache");
    }
}
