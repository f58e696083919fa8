//! Errors shared by the cinetag crates.

/// Failures of the path helpers and shared types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path that should exist does not.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A path or value of the wrong shape, e.g. a file where a directory
    /// was expected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
