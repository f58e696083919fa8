//! Parse result types.

use cinetag_common::MediaKind;

/// Season/episode numbers taken from an `SxxEyy` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

/// Everything the heuristic extracts from one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedName {
    /// Search query for the metadata provider. Never empty for a non-empty
    /// input.
    pub title: String,
    /// Movie or series, decided by the presence of the episode marker.
    pub kind: MediaKind,
    /// Numbers from the episode marker (series only).
    pub episode: Option<EpisodeRef>,
    /// Year token the movie title was cut at (movies only).
    pub year: Option<u16>,
}

impl ParsedName {
    /// Returns `true` if the filename carried an episode marker.
    pub fn is_series(&self) -> bool {
        self.kind.is_series()
    }
}
