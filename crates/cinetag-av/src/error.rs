//! Failures of probing and tagging.

use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program could not be started or located.
    #[error("{tool} not found")]
    ToolNotFound { tool: String },

    /// Non-zero exit; `message` holds the trimmed stderr.
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// The tool was killed after running past its deadline.
    #[error("{tool} timed out after {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },

    /// Tool output did not have the expected shape.
    #[error("malformed {tool} output: {message}")]
    MalformedOutput { tool: String, message: String },

    /// The original was moved to its backup but the processed file could not
    /// take its place. Both files are left on disk.
    #[error(
        "swap incomplete: original kept at {}, processed output left at {}",
        backup.display(),
        processed.display()
    )]
    SwapIncomplete { backup: PathBuf, processed: PathBuf },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument the tagger cannot use, such as a cover that is not a file.
    #[error("{0}")]
    InvalidInput(String),

    /// A container other than Matroska or MP4.
    #[error("unsupported {0}")]
    Unsupported(String),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn malformed_output(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Map a spawn failure, turning `NotFound` into [`Error::ToolNotFound`].
    pub(crate) fn from_spawn(tool: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::tool_not_found(tool)
        } else {
            Self::Io(err)
        }
    }
}
