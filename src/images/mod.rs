//! Cover art retrieval.
//!
//! Posters are streamed into a temporary file that lives only as long as
//! the item being tagged.

mod poster;

pub use poster::PosterFetcher;
