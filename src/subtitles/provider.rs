//! Trait definition and types for subtitle providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What to look for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleQuery {
    /// Resolved display title.
    pub title: String,
    pub year: i32,
    /// Season and episode numbers, for series episodes.
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Target language tag, e.g. `pt-BR`.
    pub language: String,
}

/// A downloadable subtitle file offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleFile {
    pub file_id: u64,
    pub file_name: Option<String>,
    pub language: Option<String>,
}

/// Async trait a subtitle backend implements.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Short, lowercase identifier for this provider.
    fn name(&self) -> &'static str;

    /// Files matching `query`, in the provider's order.
    async fn search(&self, query: &SubtitleQuery) -> anyhow::Result<Vec<SubtitleFile>>;

    /// The content of one file.
    async fn download(&self, file: &SubtitleFile) -> anyhow::Result<Vec<u8>>;
}
