//! Language-fallback resolution of a parsed title to one candidate.

use std::sync::Arc;

use cinetag_common::MediaKind;
use tracing::{debug, info, warn};

use super::provider::{MediaDetails, MetadataCandidate, MetadataProvider};

pub const DEFAULT_PRIMARY_LANGUAGE: &str = "pt-BR";
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en-US";

/// Picks the first usable search hit, trying the primary language before the
/// fallback one.
#[derive(Clone)]
pub struct Resolver {
    provider: Arc<dyn MetadataProvider>,
    primary_language: String,
    fallback_language: String,
}

impl Resolver {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        primary_language: impl Into<String>,
        fallback_language: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            primary_language: primary_language.into(),
            fallback_language: fallback_language.into(),
        }
    }

    pub fn primary_language(&self) -> &str {
        &self.primary_language
    }

    pub fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }

    /// Languages in the order they are tried, without duplicates.
    fn languages(&self) -> Vec<&str> {
        let mut languages = vec![self.primary_language.as_str()];
        if self.fallback_language != self.primary_language {
            languages.push(self.fallback_language.as_str());
        }
        languages
    }

    /// Resolve `title` to a candidate.
    ///
    /// The fallback language is searched only when the primary search comes
    /// back empty. The first hit of the first non-empty search is the answer:
    /// if it has no identifier the title is `Ok(None)`. A transport or
    /// decoding error aborts resolution for this title and is returned.
    pub async fn resolve(
        &self,
        title: &str,
        kind: MediaKind,
    ) -> anyhow::Result<Option<MetadataCandidate>> {
        let provider = self.provider.name();

        for language in self.languages() {
            let results = self.provider.search(title, kind, language).await?;
            debug!(provider, title, %kind, language, count = results.len(), "Search results");

            let Some(candidate) = results.into_iter().next() else {
                warn!(provider, title, language, "No results");
                continue;
            };

            if candidate.provider_id.is_empty() {
                warn!(provider, title, language, "First result has no identifier");
                return Ok(None);
            }

            info!(
                provider,
                title,
                language,
                matched = %candidate.display_title,
                id = %candidate.provider_id,
                "Resolved"
            );
            return Ok(Some(candidate));
        }

        Ok(None)
    }

    /// Fetch the full record of a resolved candidate in the primary language.
    pub async fn details(&self, candidate: &MetadataCandidate) -> anyhow::Result<MediaDetails> {
        self.provider
            .details(
                &candidate.provider_id,
                candidate.kind,
                &self.primary_language,
            )
            .await
    }
}
