//! Metadata tagging with an ffmpeg stream copy.

use crate::command;
use crate::swap::swap_in;
use crate::tools::FFMPEG;
use crate::{Error, Result};
use cinetag_common::paths::{processed_path, DEFAULT_PROCESSED_MARKER};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Containers the tagger writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Matroska container
    Mkv,
    /// MPEG-4 Part 14 container
    Mp4,
}

impl Container {
    /// Get the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mkv => "mkv",
            Container::Mp4 => "mp4",
        }
    }

    /// Container of a file, judged by its extension.
    ///
    /// ```
    /// use std::path::Path;
    /// use cinetag_av::Container;
    ///
    /// assert_eq!(Container::from_path(Path::new("a.MKV")), Some(Container::Mkv));
    /// assert_eq!(Container::from_path(Path::new("a.avi")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mkv" | "matroska" => Ok(Container::Mkv),
            "mp4" => Ok(Container::Mp4),
            _ => Err(format!("Unsupported container format: {}", s)),
        }
    }
}

/// Container-level tags written into the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub title: String,
    /// Release or first-air date, `YYYY-MM-DD` or empty.
    pub date: String,
    pub genres: Vec<String>,
}

/// Build the ffmpeg argument list for one tagging run.
///
/// ```
/// use std::path::Path;
/// use cinetag_av::{ffmpeg_args, TagSet};
///
/// let tags = TagSet { title: "Ironheart".into(), date: "2025-06-24".into(), genres: vec![] };
/// let args = ffmpeg_args(Path::new("in.mkv"), &tags, None, Path::new("out.mkv"));
/// assert_eq!(args.last().unwrap(), "out.mkv");
/// assert!(args.iter().any(|a| a == "title=Ironheart"));
/// ```
pub fn ffmpeg_args(input: &Path, tags: &TagSet, cover: Option<&Path>, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];

    if let Some(cover) = cover {
        args.extend(["-i".into(), cover.into()]);
        args.extend(["-map", "0", "-map", "1"].map(OsString::from));
    }

    args.extend(["-c", "copy"].map(OsString::from));
    args.push("-metadata".into());
    args.push(format!("title={}", tags.title).into());
    args.push("-metadata".into());
    args.push(format!("date={}", tags.date).into());

    if !tags.genres.is_empty() {
        args.push("-metadata".into());
        args.push(format!("genre={}", tags.genres.join(", ")).into());
    }

    if cover.is_some() {
        args.extend(["-c:v:1", "mjpeg", "-disposition:v:1", "attached_pic"].map(OsString::from));
    }

    args.push(output.into());
    args
}

/// Writes tags through `ffmpeg` and swaps the result in place.
#[derive(Debug, Clone)]
pub struct Tagger {
    program: PathBuf,
    marker: String,
}

impl Default for Tagger {
    fn default() -> Self {
        Self::new(FFMPEG, DEFAULT_PROCESSED_MARKER)
    }
}

impl Tagger {
    /// Use the given ffmpeg program and processed-file marker.
    pub fn new(program: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            marker: marker.into(),
        }
    }

    /// Tag `path` in place. The pre-mutation bytes end up at `<path>.bak`.
    ///
    /// Returns the path of the tagged file, which is `path` itself.
    pub fn write(&self, path: &Path, tags: &TagSet, cover: Option<&Path>) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let container = Container::from_path(path)
            .ok_or_else(|| Error::Unsupported(format!("container of {}", path.display())))?;
        if let Some(cover) = cover.filter(|c| !c.is_file()) {
            return Err(Error::InvalidInput(format!(
                "cover image is not a file: {}",
                cover.display()
            )));
        }

        let output = processed_path(path, &self.marker);
        let args = ffmpeg_args(path, tags, cover, &output);

        #[cfg(feature = "tracing")]
        tracing::info!(
            path = %path.display(),
            container = container.extension(),
            cover = cover.is_some(),
            "Writing metadata"
        );
        #[cfg(feature = "tracing")]
        tracing::debug!(program = %self.program.display(), ?args, "ffmpeg command");

        // A stream copy of a large file can take minutes, so no deadline
        let result = command::run(Command::new(&self.program).args(&args), FFMPEG, None);

        let output_status = match result {
            Ok(out) => out,
            Err(e) => {
                let _ = std::fs::remove_file(&output);
                return Err(e);
            }
        };

        if !output_status.status.success() {
            let _ = std::fs::remove_file(&output);
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            return Err(Error::tool_failed(FFMPEG, stderr.trim()));
        }

        swap_in(path, &output)?;

        #[cfg(feature = "tracing")]
        tracing::info!(path = %path.display(), "Metadata written");

        Ok(path.to_path_buf())
    }
}
