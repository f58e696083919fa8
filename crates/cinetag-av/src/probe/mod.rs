//! Stream inspection through `ffprobe`.
//!
//! Only two questions are asked of a file: which language the first audio
//! stream is tagged with, and whether any subtitle stream carries a given
//! language tag. Both are answered from ffprobe's compact output
//! (`index|language` per stream).

mod compact;
mod ffprobe;

pub use compact::{parse_compact_streams, StreamTag};
pub use ffprobe::{Ffprobe, StreamKind, DEFAULT_PROBE_TIMEOUT};
