//! Domain patterns matched against page hostnames.
//!
//! A pattern containing `*` is a wildcard: each `*` becomes `.*` in a regex
//! anchored at the start, case-insensitive, optionally preceded by a scheme.
//! Other characters are not escaped, so `.` matches any character.
//! Any other pattern is exact, tolerating a `www.` prefix on either side.

use regex::{Regex, RegexBuilder};
use tracing::warn;

#[derive(Debug, Clone)]
pub enum DomainPattern {
    Exact(String),
    Wildcard(Regex),
    /// A wildcard pattern that did not compile; matches nothing.
    Invalid(String),
}

impl DomainPattern {
    pub fn new(pattern: &str) -> Self {
        if !pattern.contains('*') {
            return DomainPattern::Exact(pattern.to_string());
        }

        let source = format!("^(https?://)?{}", pattern.replace('*', ".*"));
        match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(re) => DomainPattern::Wildcard(re),
            Err(e) => {
                warn!(pattern, error = %e, "wildcard domain pattern does not compile");
                DomainPattern::Invalid(pattern.to_string())
            }
        }
    }

    /// Whether `hostname` belongs to this pattern.
    pub fn matches_host(&self, hostname: &str) -> bool {
        match self {
            DomainPattern::Exact(domain) => {
                hostname == domain
                    || hostname.strip_prefix("www.") == Some(domain.as_str())
                    || domain.strip_prefix("www.") == Some(hostname)
            }
            DomainPattern::Wildcard(re) => re.is_match(hostname),
            DomainPattern::Invalid(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_subdomain() {
        let p = DomainPattern::new("*.example.com");
        assert!(matches!(p, DomainPattern::Wildcard(_)));
        assert!(p.matches_host("sub.example.com"));
        assert!(p.matches_host("a.b.example.com"));
        assert!(!p.matches_host("example.org"));
    }

    #[test]
    fn test_wildcard_is_case_insensitive() {
        let p = DomainPattern::new("*.Example.COM");
        assert!(p.matches_host("www.example.com"));
    }

    #[test]
    fn test_wildcard_is_anchored_at_start_only() {
        let p = DomainPattern::new("shop*");
        assert!(p.matches_host("shop.example.com"));
        assert!(!p.matches_host("myshop.example.com"));
    }

    #[test]
    fn test_exact_www_tolerance() {
        let p = DomainPattern::new("example.com");
        assert!(p.matches_host("example.com"));
        assert!(p.matches_host("www.example.com"));
        assert!(!p.matches_host("sub.example.com"));

        let p = DomainPattern::new("www.example.com");
        assert!(p.matches_host("example.com"));
    }

    #[test]
    fn test_invalid_wildcard_matches_nothing() {
        let p = DomainPattern::new("*(.example.com");
        assert!(matches!(p, DomainPattern::Invalid(_)));
        assert!(!p.matches_host("a.example.com"));
    }
}
