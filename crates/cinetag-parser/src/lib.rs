//! # cinetag-parser
//!
//! Turns a release-style video filename into a clean metadata search query
//! and a movie/series classification.
//!
//! The heuristic is deliberately small:
//!
//! - a case-insensitive `S<digits>E<digits>` marker anywhere in the name makes
//!   the file a series episode, and the title is everything before it;
//! - otherwise the file is a movie, and the name is cut at the first
//!   delimiter-prefixed 4-digit year (resolution, codec, source and channel
//!   tags follow the year in release names);
//! - delimiters become spaces and whitespace runs collapse to one space.
//!
//! Parsing is total: it never fails and never returns an empty title for a
//! non-empty filename.
//!
//! ## Quick Start
//!
//! ```
//! use cinetag_parser::parse;
//!
//! let parsed = parse("Ironheart.S01E01.1080p.WEB-DL.DUAL.5.1.mkv");
//! assert_eq!(parsed.title, "Ironheart");
//! assert!(parsed.is_series());
//!
//! let parsed = parse("A.Mulher.no.Jardim.2025.1080p.BluRay.DUAL.5.1.mkv");
//! assert_eq!(parsed.title, "A Mulher no Jardim");
//! assert_eq!(parsed.year, Some(2025));
//! assert!(!parsed.is_series());
//! ```

mod model;
mod parser;

pub use cinetag_common::MediaKind;
pub use model::{EpisodeRef, ParsedName};
pub use parser::{strip_extension, Parser, ParserConfig, DEFAULT_DELIMITER};

/// Parse a filename with the default `.` delimiter.
///
/// # Examples
///
/// ```
/// use cinetag_parser::{parse, MediaKind};
///
/// let parsed = parse("The.Mandalorian.S02E05.1080p.WEB.H264-FLX.mkv");
/// assert_eq!(parsed.title, "The Mandalorian");
/// assert_eq!(parsed.kind, MediaKind::Series);
/// assert_eq!(parsed.episode.map(|e| (e.season, e.episode)), Some((2, 5)));
/// ```
pub fn parse(filename: &str) -> ParsedName {
    Parser::default().parse(filename)
}

/// Parse a filename into the `(title, is_series)` pair the scanner needs.
///
/// ```
/// use cinetag_parser::parse_title;
///
/// assert_eq!(
///     parse_title("As.Marvels.2023.1080p.BluRay.EAC3.AAC.DUAL.5.1.mkv"),
///     ("As Marvels".to_string(), false)
/// );
/// ```
pub fn parse_title(filename: &str) -> (String, bool) {
    let parsed = parse(filename);
    let is_series = parsed.is_series();
    (parsed.title, is_series)
}
