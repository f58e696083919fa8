//! The filename heuristic.

use std::sync::LazyLock;

use cinetag_common::MediaKind;
use regex::Regex;

use crate::model::{EpisodeRef, ParsedName};

/// Separator used by scene-style release names.
pub const DEFAULT_DELIMITER: char = '.';

// Season/episode code, e.g. S01E01, s1e12, S2024E100.
static EPISODE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)s([0-9]+)e([0-9]+)").unwrap());

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Character separating tokens in the release name.
    pub delimiter: char,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Filename parser.
///
/// ```
/// use cinetag_parser::{Parser, ParserConfig};
///
/// let parser = Parser::new(ParserConfig { delimiter: '_' });
/// let parsed = parser.parse("Some_Movie_1999_720p.mkv");
/// assert_eq!(parsed.title, "Some Movie");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a parser with the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a filename (not a path) into a [`ParsedName`].
    pub fn parse(&self, filename: &str) -> ParsedName {
        let stem = strip_extension(filename);

        let mut parsed = if EPISODE_MARKER.is_match(stem) {
            self.parse_series(stem)
        } else {
            self.parse_movie(stem)
        };

        if parsed.title.is_empty() {
            parsed.title = self.fallback_title(filename, stem);
        }

        parsed
    }

    fn parse_series(&self, stem: &str) -> ParsedName {
        let Some(captures) = EPISODE_MARKER.captures(stem) else {
            return ParsedName {
                title: self.normalize(stem),
                kind: MediaKind::Series,
                episode: None,
                year: None,
            };
        };

        // Group 0 always exists on a successful capture.
        let marker = captures.get(0).map(|m| m.start()).unwrap_or(stem.len());
        let episode = EpisodeRef {
            season: saturating_number(captures.get(1).map(|m| m.as_str())),
            episode: saturating_number(captures.get(2).map(|m| m.as_str())),
        };

        ParsedName {
            title: self.normalize(&stem[..marker]),
            kind: MediaKind::Series,
            episode: Some(episode),
            year: None,
        }
    }

    fn parse_movie(&self, stem: &str) -> ParsedName {
        match find_year(stem, self.config.delimiter) {
            Some((cut, year)) => ParsedName {
                title: self.normalize(&stem[..cut]),
                kind: MediaKind::Movie,
                episode: None,
                year: Some(year),
            },
            None => ParsedName {
                title: self.normalize(stem),
                kind: MediaKind::Movie,
                episode: None,
                year: None,
            },
        }
    }

    /// Replace delimiters with spaces, trim, and collapse whitespace runs.
    fn normalize(&self, raw: &str) -> String {
        raw.replace(self.config.delimiter, " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fallback_title(&self, filename: &str, stem: &str) -> String {
        let from_stem = self.normalize(stem);
        if !from_stem.is_empty() {
            return from_stem;
        }
        let from_name = self.normalize(filename);
        if !from_name.is_empty() {
            return from_name;
        }
        filename.to_string()
    }
}

/// Strip the last extension, keeping names that are only an extension
/// (`.hidden`) intact.
///
/// ```
/// use cinetag_parser::strip_extension;
///
/// assert_eq!(strip_extension("Movie.2020.mkv"), "Movie.2020");
/// assert_eq!(strip_extension(".hidden"), ".hidden");
/// assert_eq!(strip_extension("no_extension"), "no_extension");
/// ```
pub fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) if !filename[..dot].trim_start_matches('.').is_empty() => &filename[..dot],
        _ => filename,
    }
}

/// Byte offset of the first `<delimiter><4 digits>` token and its year value.
fn find_year(stem: &str, delimiter: char) -> Option<(usize, u16)> {
    stem.char_indices()
        .filter(|&(_, c)| c == delimiter)
        .find_map(|(at, _)| {
            let digits = stem.get(at + delimiter.len_utf8()..)?.get(..4)?;
            if digits.bytes().all(|b| b.is_ascii_digit()) {
                digits.parse().ok().map(|year| (at, year))
            } else {
                None
            }
        })
}

fn saturating_number(digits: Option<&str>) -> u32 {
    digits
        .map(|d| d.parse().unwrap_or(u32::MAX))
        .unwrap_or_default()
}
