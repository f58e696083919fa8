//! Core type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media a file holds, as inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A feature film.
    Movie,
    /// An episode of a TV series.
    Series,
}

impl MediaKind {
    /// Returns `true` for [`MediaKind::Series`].
    pub fn is_series(self) -> bool {
        matches!(self, Self::Series)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}
