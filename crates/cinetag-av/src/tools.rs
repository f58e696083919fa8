//! Locating `ffmpeg` and `ffprobe`.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default program name of the remux tool.
pub const FFMPEG: &str = "ffmpeg";

/// Default program name of the probing tool.
pub const FFPROBE: &str = "ffprobe";

/// Result of running a tool with `-version`.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// The program as given: a bare name or a path.
    pub name: String,
    pub available: bool,
    /// First line printed by `-version`.
    pub version: Option<String>,
    /// Resolved executable, when it could be found.
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    fn missing(name: String) -> Self {
        Self {
            name,
            available: false,
            version: None,
            path: None,
        }
    }
}

/// Run `program -version` and report what happened.
///
/// `program` is either a bare name, looked up on `PATH`, or a path.
///
/// ```no_run
/// use cinetag_av::check_tool;
///
/// let ffprobe = check_tool("ffprobe");
/// match ffprobe.version {
///     Some(v) if ffprobe.available => println!("{v}"),
///     _ => eprintln!("ffprobe not usable"),
/// }
/// ```
pub fn check_tool(program: impl AsRef<Path>) -> ToolInfo {
    let program = program.as_ref();
    let name = program.display().to_string();

    let output = match Command::new(program).arg("-version").output() {
        Ok(output) if output.status.success() => output,
        _ => return ToolInfo::missing(name),
    };

    let banner = String::from_utf8_lossy(&output.stdout);
    ToolInfo {
        name,
        available: true,
        version: banner.lines().next().map(str::to_owned),
        path: which::which(program).ok(),
    }
}

/// Check both tools, using configured paths where given.
pub fn check_tools(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Vec<ToolInfo> {
    [(ffmpeg, FFMPEG), (ffprobe, FFPROBE)]
        .into_iter()
        .map(|(configured, default)| check_tool(configured.unwrap_or(Path::new(default))))
        .collect()
}

/// Find `name` on `PATH`.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Resolve a tool, trusting `configured` over `PATH`.
///
/// A configured path that does not exist is an error; there is no fallback
/// to `PATH` in that case.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(Error::tool_not_found(path.display().to_string())),
        None => require_tool(name),
    }
}
