//! Cinetag-Common: Shared types, path conventions, and errors.
//!
//! This crate provides functionality used across the cinetag crates:
//!
//! - **Core Types**: [`MediaKind`] for the movie/series split
//! - **Path Utilities**: video extension checks, the processed marker, and the
//!   backup/sidecar/processed path conventions used by the writer and scanner
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use cinetag_common::{MediaKind, Error, Result};
//! use cinetag_common::paths::{is_video_file, backup_path};
//! use std::path::Path;
//!
//! let kind = MediaKind::Series;
//! assert!(kind.is_series());
//!
//! assert!(is_video_file(Path::new("movie.mkv")));
//! assert_eq!(backup_path(Path::new("/m/movie.mkv")), Path::new("/m/movie.mkv.bak"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("not a directory"))
//! }
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
