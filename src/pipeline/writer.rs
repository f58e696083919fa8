//! The tagging step as the pipeline sees it.

use std::path::{Path, PathBuf};

use cinetag_av::{Container, TagSet, Tagger};

use crate::metadata::{MediaDetails, MetadataCandidate};

/// Writes resolved metadata (and an optional cover) into a video file.
///
/// Implementations block; the pipeline calls them from a blocking task.
pub trait MetadataWriter: Send + Sync {
    /// Whether the container of `path` can be tagged.
    fn supports(&self, path: &Path) -> bool;

    /// Tag `path` in place, returning the path of the tagged file. The
    /// pre-mutation bytes are kept at `<path>.bak`.
    fn write(
        &self,
        path: &Path,
        candidate: &MetadataCandidate,
        details: &MediaDetails,
        cover: Option<&Path>,
    ) -> Result<PathBuf, cinetag_av::Error>;
}

/// Tags written for a resolved file.
///
/// The title is the candidate's; the date and genres come from the full
/// record, with the candidate's date used when the record has none.
pub fn tag_set(candidate: &MetadataCandidate, details: &MediaDetails) -> TagSet {
    let date = details
        .release_date
        .as_deref()
        .filter(|d| !d.is_empty())
        .or(candidate.release_date.as_deref())
        .unwrap_or_default();

    TagSet {
        title: candidate.display_title.clone(),
        date: date.to_string(),
        genres: details.genres.clone(),
    }
}

impl MetadataWriter for Tagger {
    fn supports(&self, path: &Path) -> bool {
        Container::from_path(path).is_some()
    }

    fn write(
        &self,
        path: &Path,
        candidate: &MetadataCandidate,
        details: &MediaDetails,
        cover: Option<&Path>,
    ) -> Result<PathBuf, cinetag_av::Error> {
        Tagger::write(self, path, &tag_set(candidate, details), cover)
    }
}
