//! Metadata lookup for scanned files.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and shared data types.
//! - [`providers`] -- Concrete provider implementations (TMDB).
//! - [`resolver`] -- Primary/fallback language resolution of a parsed title.

pub mod provider;
pub mod providers;
pub mod resolver;

pub use provider::{
    release_year, DisplayName, MediaDetails, MetadataCandidate, MetadataProvider, UNKNOWN_TITLE,
};
pub use resolver::{Resolver, DEFAULT_FALLBACK_LANGUAGE, DEFAULT_PRIMARY_LANGUAGE};
