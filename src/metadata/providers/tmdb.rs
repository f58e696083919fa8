//! TMDB v3 client.
//!
//! Searches and detail lookups take the language as an argument, so one
//! client serves both the primary and the fallback pass. Requests share a
//! 4/s token bucket ([`governor`]); a 429 is retried up to three times,
//! waiting for `Retry-After` seconds. Both hosts are configurable.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use cinetag_common::MediaKind;
use governor::{Quota, RateLimiter};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::metadata::provider::{DisplayName, MediaDetails, MetadataCandidate, MetadataProvider};

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;
const REQUESTS_PER_SECOND: u32 = 4;

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbSearchItem>,
}

/// Movie and TV search hits share one shape: movies fill `title` and
/// `release_date`, series fill `name` and `first_air_date`.
#[derive(Debug, Deserialize)]
struct TmdbSearchItem {
    id: Option<u64>,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    poster_path: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct TmdbDetail {
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    genres: Option<Vec<TmdbGenre>>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

/// [`MetadataProvider`] backed by TMDB.
///
/// Nothing about the client changes after construction.
///
/// ```no_run
/// use cinetag::metadata::providers::TmdbProvider;
///
/// let provider = TmdbProvider::new("your-api-key".into())?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a new TMDB provider against the public API.
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::with_base_urls(api_key, TMDB_BASE_URL, TMDB_IMAGE_BASE)
    }

    /// Create a provider against custom API and image hosts.
    pub fn with_base_urls(
        api_key: String,
        base_url: impl Into<String>,
        image_base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let quota = Quota::per_second(NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            image_base_url: image_base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// GET `url`, waiting on the rate limiter and retrying 429s.
    async fn get(&self, url: &Url) -> anyhow::Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            // reqwest errors carry the full URL, API key included
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(reqwest::Error::without_url)
                .with_context(|| format!("TMDB request failed: {}", redact(url)))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS || attempt >= MAX_RETRIES {
                return response
                    .error_for_status()
                    .map_err(reqwest::Error::without_url)
                    .with_context(|| format!("TMDB request returned error: {}", redact(url)));
            }

            attempt += 1;
            let wait = retry_after(&response).unwrap_or(1);
            warn!(attempt, wait_secs = wait, "TMDB rate limit hit, waiting");
            tokio::time::sleep(Duration::from_secs(wait)).await;
        }
    }

    /// `{base_url}{path}` with the key, the language and `params` in the query.
    fn endpoint(&self, path: &str, language: &str, params: &[(&str, &str)]) -> anyhow::Result<Url> {
        let query = [("api_key", self.api_key.as_str()), ("language", language)];
        Url::parse_with_params(
            &format!("{}{path}", self.base_url),
            query.iter().chain(params.iter()),
        )
        .with_context(|| format!("invalid TMDB URL for {path}"))
    }
}

/// `url` with the `api_key` value masked, for logs and error messages.
fn redact(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

fn retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn search_path(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "/search/movie",
        MediaKind::Series => "/search/tv",
    }
}

fn details_path(kind: MediaKind, provider_id: &str) -> String {
    match kind {
        MediaKind::Movie => format!("/movie/{provider_id}"),
        MediaKind::Series => format!("/tv/{provider_id}"),
    }
}

/// Blank strings from the API count as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn to_candidate(item: TmdbSearchItem, kind: MediaKind, language: &str) -> MetadataCandidate {
    MetadataCandidate {
        provider_id: item.id.map(|id| id.to_string()).unwrap_or_default(),
        display_title: DisplayName::from_fields(item.title, item.name).into_string(),
        release_date: non_blank(item.release_date).or(non_blank(item.first_air_date)),
        poster_path: non_blank(item.poster_path),
        genre_ids: item.genre_ids,
        kind,
        language: language.to_string(),
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(
        &self,
        title: &str,
        kind: MediaKind,
        language: &str,
    ) -> anyhow::Result<Vec<MetadataCandidate>> {
        let url = self.endpoint(search_path(kind), language, &[("query", title)])?;
        debug!(title, %kind, language, "TMDB search");

        let body: TmdbSearchResponse = self
            .get(&url)
            .await?
            .json()
            .await
            .with_context(|| format!("failed to parse TMDB {kind} search response"))?;

        Ok(body
            .results
            .into_iter()
            .map(|item| to_candidate(item, kind, language))
            .collect())
    }

    async fn details(
        &self,
        provider_id: &str,
        kind: MediaKind,
        language: &str,
    ) -> anyhow::Result<MediaDetails> {
        let url = self.endpoint(&details_path(kind, provider_id), language, &[])?;
        debug!(provider_id, %kind, language, "TMDB details");

        let detail: TmdbDetail = self
            .get(&url)
            .await?
            .json()
            .await
            .with_context(|| format!("failed to parse TMDB {kind} detail response"))?;

        Ok(MediaDetails {
            display_title: DisplayName::from_fields(detail.title, detail.name).into_string(),
            release_date: non_blank(detail.release_date).or(non_blank(detail.first_air_date)),
            genres: detail
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|g| g.name)
                .collect(),
        })
    }

    fn image_url(&self, poster_path: &str) -> String {
        if poster_path.starts_with('/') {
            format!("{}{poster_path}", self.image_base_url)
        } else {
            format!("{}/{poster_path}", self.image_base_url)
        }
    }
}
