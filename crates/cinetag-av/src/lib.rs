//! # cinetag-av
//!
//! Thin, blocking wrappers over the `ffprobe` and `ffmpeg` command-line
//! tools:
//!
//! - inspecting a file's audio and subtitle stream language tags
//! - writing container-level metadata (title, date, genre, cover art) with a
//!   stream copy, then swapping the result in place of the original while
//!   keeping a `.bak` copy
//! - detecting the tools
//!
//! ## Features
//!
//! - `probe` (default) - stream inspection through ffprobe
//! - `tag` (default) - metadata tagging through ffmpeg
//! - `tracing` - log through `tracing`
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use cinetag_av::{Ffprobe, TagSet, Tagger};
//!
//! let path = Path::new("/library/Movie.2020.mkv");
//! let audio = Ffprobe::default().audio_language(path);
//! println!("audio language: {audio:?}");
//!
//! let tags = TagSet { title: "Movie".into(), date: "2020-01-01".into(), genres: vec![] };
//! Tagger::default().write(path, &tags, None)?;
//! # Ok::<(), cinetag_av::Error>(())
//! ```

mod command;
mod error;
pub mod swap;
pub mod tools;

#[cfg(feature = "probe")]
pub mod probe;

pub mod actions;

// Re-exports
pub use error::{Error, Result};
pub use swap::swap_in;
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};

#[cfg(feature = "probe")]
pub use probe::{Ffprobe, StreamKind, StreamTag};

#[cfg(feature = "tag")]
pub use actions::{ffmpeg_args, Container, TagSet, Tagger};
