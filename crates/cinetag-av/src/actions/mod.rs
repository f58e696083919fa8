//! Media mutation actions.

#[cfg(feature = "tag")]
mod tag;

#[cfg(feature = "tag")]
pub use tag::{ffmpeg_args, Container, TagSet, Tagger};
