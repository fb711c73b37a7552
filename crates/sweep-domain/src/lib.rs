//! # sweep-domain
//!
//! Domain-aware logic for the Sweep clearing core:
//!
//! - [`normalize`]: collapse a hostname to its registrable root domain.
//! - [`pattern`]: exact and wildcard domain matching against hostnames.
//! - [`classify`]: assign a [`SiteCategory`](sweep_types::SiteCategory) from ordered rule tables.
//! - [`recommend`]: pick which data categories are worth clearing for a domain.
//!
//! Everything here is synchronous and total: malformed input degrades to a
//! default answer instead of failing.

pub mod classify;
pub mod normalize;
pub mod pattern;
pub mod recommend;

pub use classify::{SiteClassifier, SiteTable};
pub use normalize::root_domain;
pub use pattern::DomainPattern;
pub use recommend::{
    RecommendationEngine, RecommendationSet, RecommendationSource, RecommendationTables,
};
