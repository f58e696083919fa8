//! Subtitle lookup and download.
//!
//! - [`provider`] -- Trait definition and query/file types.
//! - [`opensubtitles`] -- OpenSubtitles REST v1 client.
//! - [`fetcher`] -- The pipeline-facing step that writes the sidecar file.

pub mod fetcher;
pub mod opensubtitles;
pub mod provider;

pub use fetcher::{Fetcher, SubtitleFetcher, DEFAULT_SUBTITLE_LANGUAGE};
pub use opensubtitles::{Credentials, OpenSubtitlesClient, OPENSUBTITLES_BASE_URL};
pub use provider::{SubtitleFile, SubtitleProvider, SubtitleQuery};
