//! Parser for `-of compact=p=0:nk=1` stream listings.

use crate::{Error, Result};
use serde::Serialize;

/// One stream line of the compact listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamTag {
    /// Absolute stream index within the container.
    pub index: u32,
    /// The stream's `language` tag, if it has one.
    pub language: Option<String>,
}

/// Parse ffprobe's compact stream listing.
///
/// Every non-blank line must be `<index>` or `<index>|<language>` with a
/// numeric index. Anything else is [`Error::MalformedOutput`].
///
/// ```
/// use cinetag_av::probe::parse_compact_streams;
///
/// let streams = parse_compact_streams("1|por\n2\n").unwrap();
/// assert_eq!(streams[0].language.as_deref(), Some("por"));
/// assert_eq!(streams[1].language, None);
///
/// assert!(parse_compact_streams("Stream #0:1: Audio").is_err());
/// ```
pub fn parse_compact_streams(stdout: &str) -> Result<Vec<StreamTag>> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<StreamTag> {
    let mut fields = line.split('|');
    let index_field = fields.next().unwrap_or_default().trim();
    let language_field = fields.next().map(str::trim);

    if fields.next().is_some() {
        return Err(Error::malformed_output(
            "ffprobe",
            format!("unexpected extra fields in line {line:?}"),
        ));
    }

    let index = index_field.parse::<u32>().map_err(|_| {
        Error::malformed_output("ffprobe", format!("non-numeric stream index in line {line:?}"))
    })?;

    let language = language_field
        .filter(|lang| !lang.is_empty())
        .map(str::to_string);

    Ok(StreamTag { index, language })
}
