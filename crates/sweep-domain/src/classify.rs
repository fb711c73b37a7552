//! Site classification from ordered domain tables.
//!
//! A domain is classified by, in order:
//!
//! 1. an exact match of the raw domain against the table;
//! 2. the first table entry (in table order) whose pattern contains the root
//!    domain or is contained in it;
//! 3. [`SiteCategory::Other`].
//!
//! Table order is significant: `google.com` is listed before
//! `mail.google.com` so that `maps.google.com` stays a search site while the
//! exact host `mail.google.com` is still mail.

use sweep_types::SiteCategory;

use crate::normalize::root_domain;

/// Keywords that mark a domain as a complex web application.
pub const COMPLEX_APP_KEYWORDS: &[&str] = &[
    "app",
    "portal",
    "dashboard",
    "admin",
    "account",
    "system",
    "platform",
];

const BUILTIN_SITES: &[(&str, SiteCategory)] = &[
    // Search
    ("google.com", SiteCategory::Search),
    ("bing.com", SiteCategory::Search),
    ("baidu.com", SiteCategory::Search),
    ("duckduckgo.com", SiteCategory::Search),
    ("yandex.ru", SiteCategory::Search),
    // Social
    ("facebook.com", SiteCategory::Social),
    ("twitter.com", SiteCategory::Social),
    ("instagram.com", SiteCategory::Social),
    ("linkedin.com", SiteCategory::Social),
    ("weibo.com", SiteCategory::Social),
    ("tiktok.com", SiteCategory::Social),
    ("douyin.com", SiteCategory::Social),
    ("xiaohongshu.com", SiteCategory::Social),
    // Video
    ("youtube.com", SiteCategory::Video),
    ("bilibili.com", SiteCategory::Video),
    ("youku.com", SiteCategory::Video),
    ("iqiyi.com", SiteCategory::Video),
    ("vimeo.com", SiteCategory::Video),
    // Streaming
    ("netflix.com", SiteCategory::Streaming),
    ("twitch.tv", SiteCategory::Streaming),
    ("hulu.com", SiteCategory::Streaming),
    ("spotify.com", SiteCategory::Streaming),
    ("disneyplus.com", SiteCategory::Streaming),
    // Shopping
    ("amazon.com", SiteCategory::Shopping),
    ("ebay.com", SiteCategory::Shopping),
    ("taobao.com", SiteCategory::Shopping),
    ("tmall.com", SiteCategory::Shopping),
    ("jd.com", SiteCategory::Shopping),
    ("aliexpress.com", SiteCategory::Shopping),
    // Banking
    ("paypal.com", SiteCategory::Banking),
    ("chase.com", SiteCategory::Banking),
    ("bankofamerica.com", SiteCategory::Banking),
    ("wellsfargo.com", SiteCategory::Banking),
    ("icbc.com.cn", SiteCategory::Banking),
    ("alipay.com", SiteCategory::Banking),
    // News
    ("cnn.com", SiteCategory::News),
    ("nytimes.com", SiteCategory::News),
    ("bbc.co.uk", SiteCategory::News),
    ("theguardian.com", SiteCategory::News),
    ("reuters.com", SiteCategory::News),
    ("sina.com.cn", SiteCategory::News),
    // Mail
    ("mail.google.com", SiteCategory::Mail),
    ("gmail.com", SiteCategory::Mail),
    ("outlook.live.com", SiteCategory::Mail),
    ("mail.yahoo.com", SiteCategory::Mail),
    ("mail.qq.com", SiteCategory::Mail),
    // Forum
    ("reddit.com", SiteCategory::Forum),
    ("stackoverflow.com", SiteCategory::Forum),
    ("quora.com", SiteCategory::Forum),
    ("zhihu.com", SiteCategory::Forum),
    ("tieba.baidu.com", SiteCategory::Forum),
    // Education
    ("wikipedia.org", SiteCategory::Education),
    ("coursera.org", SiteCategory::Education),
    ("edx.org", SiteCategory::Education),
    ("khanacademy.org", SiteCategory::Education),
    ("duolingo.com", SiteCategory::Education),
    // Web apps
    ("docs.google.com", SiteCategory::Webapp),
    ("github.com", SiteCategory::Webapp),
    ("notion.so", SiteCategory::Webapp),
    ("figma.com", SiteCategory::Webapp),
    ("slack.com", SiteCategory::Webapp),
    ("trello.com", SiteCategory::Webapp),
];

/// Ordered domain -> category table.
#[derive(Debug, Clone, Default)]
pub struct SiteTable {
    entries: Vec<(String, SiteCategory)>,
}

impl SiteTable {
    /// The table shipped with Sweep.
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_SITES
                .iter()
                .map(|(domain, category)| (domain.to_string(), *category)),
        )
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, SiteCategory)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    fn exact(&self, domain: &str) -> Option<SiteCategory> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern == domain)
            .map(|(_, category)| *category)
    }

    fn overlapping(&self, root: &str) -> Option<SiteCategory> {
        self.entries
            .iter()
            .find(|(pattern, _)| root.contains(pattern.as_str()) || pattern.contains(root))
            .map(|(_, category)| *category)
    }
}

/// Assigns a [`SiteCategory`] to a domain.
#[derive(Debug, Clone)]
pub struct SiteClassifier {
    table: SiteTable,
}

impl Default for SiteClassifier {
    fn default() -> Self {
        Self::new(SiteTable::builtin())
    }
}

impl SiteClassifier {
    pub fn new(table: SiteTable) -> Self {
        Self { table }
    }

    /// Classify `domain`. Never fails; unknown domains are [`SiteCategory::Other`].
    pub fn classify(&self, domain: &str) -> SiteCategory {
        if let Some(category) = self.table.exact(domain) {
            return category;
        }

        let root = root_domain(domain);
        // An empty root is contained in every pattern.
        if root.is_empty() {
            return SiteCategory::Other;
        }

        self.table.overlapping(&root).unwrap_or(SiteCategory::Other)
    }

    /// Whether the raw domain looks like a complex web application
    /// (dashboards, portals, admin consoles).
    pub fn is_complex_web_app(&self, domain: &str) -> bool {
        let lower = domain.to_ascii_lowercase();
        COMPLEX_APP_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }
}
