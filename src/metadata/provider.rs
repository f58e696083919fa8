//! Trait definition and types for metadata providers.
//!
//! This module defines the [`MetadataProvider`] trait the resolver talks to,
//! along with the candidate and detail records it returns. The language of
//! every request is an explicit argument; providers hold no per-request
//! state.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use cinetag_common::MediaKind;
use serde::{Deserialize, Serialize};

/// Placeholder used when a provider record carries neither a title nor a name.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

// ---------------------------------------------------------------------------
// Display names
// ---------------------------------------------------------------------------

/// The human-readable name a provider record carries.
///
/// Movies expose `title`, series expose `name`; some records carry neither.
/// Resolved once when a response is ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayName {
    Title(String),
    Name(String),
    Unknown,
}

impl DisplayName {
    /// Pick `title`, then `name`, ignoring blank values.
    ///
    /// ```
    /// use cinetag::metadata::DisplayName;
    ///
    /// let name = DisplayName::from_fields(None, Some("Ironheart".into()));
    /// assert_eq!(name, DisplayName::Name("Ironheart".into()));
    /// assert_eq!(DisplayName::from_fields(Some(" ".into()), None).as_str(), "Unknown Title");
    /// ```
    pub fn from_fields(title: Option<String>, name: Option<String>) -> Self {
        let non_blank = |s: &String| !s.trim().is_empty();
        match (title.filter(non_blank), name.filter(non_blank)) {
            (Some(title), _) => DisplayName::Title(title),
            (None, Some(name)) => DisplayName::Name(name),
            (None, None) => DisplayName::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DisplayName::Title(s) | DisplayName::Name(s) => s,
            DisplayName::Unknown => UNKNOWN_TITLE,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            DisplayName::Title(s) | DisplayName::Name(s) => s,
            DisplayName::Unknown => UNKNOWN_TITLE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates and details
// ---------------------------------------------------------------------------

/// One search hit, attached to a scanned file during Phase 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataCandidate {
    /// Provider-specific identifier (e.g. TMDB numeric ID).
    pub provider_id: String,
    pub display_title: String,
    /// Release or first-air date as `YYYY-MM-DD`, if known.
    pub release_date: Option<String>,
    /// Path fragment of the poster image, if any.
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub kind: MediaKind,
    /// Language the search that produced this candidate ran in.
    pub language: String,
}

impl MetadataCandidate {
    /// Release year taken from [`release_date`](Self::release_date).
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

/// Full record fetched by identifier before a file is tagged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    pub display_title: String,
    pub release_date: Option<String>,
    /// Genre labels (e.g. "Ação", "Drama").
    pub genres: Vec<String>,
}

impl MediaDetails {
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }
}

/// Year of a `YYYY-MM-DD` date. Bare `YYYY` is accepted too.
///
/// ```
/// use cinetag::metadata::release_year;
///
/// assert_eq!(release_year(Some("2023-11-08")), Some(2023));
/// assert_eq!(release_year(Some("1999")), Some(1999));
/// assert_eq!(release_year(Some("")), None);
/// ```
pub fn release_year(date: Option<&str>) -> Option<i32> {
    let date = date?.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    date.get(..4)
        .filter(|y| y.len() == date.len() || date.as_bytes().get(4) == Some(&b'-'))
        .and_then(|y| y.parse::<i32>().ok())
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait a metadata backend implements.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when the provider has credentials to serve requests.
    fn is_available(&self) -> bool;

    /// Search for `title` among movies or series, in `language`.
    ///
    /// Results keep the provider's own order.
    async fn search(
        &self,
        title: &str,
        kind: MediaKind,
        language: &str,
    ) -> anyhow::Result<Vec<MetadataCandidate>>;

    /// Fetch the full record for `provider_id`, in `language`.
    async fn details(
        &self,
        provider_id: &str,
        kind: MediaKind,
        language: &str,
    ) -> anyhow::Result<MediaDetails>;

    /// Absolute URL of a poster path fragment.
    fn image_url(&self, poster_path: &str) -> String;
}
