//! cinetag - organizes a local video library.
//!
//! Each video in a directory is matched against TMDB by its file name, then,
//! after a single confirmation, tagged in place (title, date, genres, cover)
//! with an ffmpeg stream copy. A subtitle is downloaded from OpenSubtitles
//! when the audio is not already in the target language.
//!
//! The library crate exposes the building blocks for integration testing.

pub mod config;
pub mod images;
pub mod logging;
pub mod metadata;
pub mod pipeline;
pub mod probe;
pub mod scanner;
pub mod subtitles;
