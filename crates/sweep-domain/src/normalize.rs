//! Root domain extraction.
//!
//! The root domain is the label pair (or triple, for compound country-code
//! suffixes such as `.co.uk` or `.com.cn`) that identifies a site regardless
//! of subdomain. No public-suffix list is consulted; the rules are fixed.

/// Generic TLDs whose second-level label is always the registrable one.
pub const COMMON_GTLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "mil", "int", "io", "co", "ai", "app", "dev",
];

/// Second-level labels that mark a compound suffix (`com.cn`, `co.uk`).
pub const SECOND_LEVEL_INDICATORS: &[&str] = &["com", "co", "org", "net", "edu", "gov"];

/// Country codes recognised for compound suffixes.
pub const COUNTRY_CODES: &[&str] = &["cn", "uk", "jp", "au", "nz", "br"];

/// Extract the root domain of `domain`.
///
/// Anything from the first `:` or `/` onward is dropped first. Input with
/// fewer than two labels is returned as-is.
///
/// ```
/// use sweep_domain::root_domain;
///
/// assert_eq!(root_domain("a.b.com"), "b.com");
/// assert_eq!(root_domain("www.news.sina.com.cn"), "sina.com.cn");
/// assert_eq!(root_domain("localhost:8080"), "localhost");
/// ```
pub fn root_domain(domain: &str) -> String {
    let host = match domain.find(|c: char| c == ':' || c == '/') {
        Some(idx) => &domain[..idx],
        None => domain,
    };

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return host.to_string();
    }

    let n = labels.len();
    let tld = labels[n - 1];
    let sld = labels[n - 2];

    if COMMON_GTLDS.contains(&tld) {
        return format!("{sld}.{tld}");
    }

    let compound_hint = tld.len() == 2 || SECOND_LEVEL_INDICATORS.contains(&sld);
    let country_code = tld.len() == 2 || COUNTRY_CODES.contains(&tld);
    if n >= 3 && compound_hint && country_code {
        return format!("{}.{sld}.{tld}", labels[n - 3]);
    }

    format!("{sld}.{tld}")
}
