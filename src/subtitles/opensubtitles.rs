//! OpenSubtitles REST v1 client.
//!
//! Flow: `POST /login` for a bearer token (cached for the run), then
//! `GET /subtitles` to search and `POST /download` to obtain a short-lived
//! link that is fetched directly.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::provider::{SubtitleFile, SubtitleProvider, SubtitleQuery};

pub const OPENSUBTITLES_BASE_URL: &str = "https://api.opensubtitles.com/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("cinetag v", env!("CARGO_PKG_VERSION"));

/// Account credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub username: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// API request/response types (private)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    attributes: SearchAttributes,
}

#[derive(Deserialize)]
struct SearchAttributes {
    language: Option<String>,
    #[serde(default)]
    files: Vec<SearchFile>,
}

#[derive(Deserialize)]
struct SearchFile {
    file_id: u64,
    file_name: Option<String>,
}

#[derive(Serialize)]
struct DownloadRequest {
    file_id: u64,
}

#[derive(Deserialize)]
struct DownloadResponse {
    link: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// OpenSubtitles client.
pub struct OpenSubtitlesClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    token: Mutex<Option<String>>,
}

impl OpenSubtitlesClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, OPENSUBTITLES_BASE_URL)
    }

    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(&credentials.api_key).context("invalid OpenSubtitles API key")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Bearer token, logging in on first use.
    async fn token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(token) = token.as_ref() {
            return Ok(token.clone());
        }

        let response: LoginResponse = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&LoginRequest {
                username: &self.credentials.username,
                password: &self.credentials.password,
            })
            .send()
            .await
            .context("OpenSubtitles login request failed")?
            .error_for_status()
            .context("OpenSubtitles login rejected")?
            .json()
            .await
            .context("failed to parse OpenSubtitles login response")?;

        info!(user = %self.credentials.username, "Logged in to OpenSubtitles");
        *token = Some(response.token.clone());
        Ok(response.token)
    }

    fn search_params(query: &SubtitleQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", query.title.clone()),
            ("year", query.year.to_string()),
            ("languages", query.language.to_lowercase()),
        ];
        if let Some(season) = query.season {
            params.push(("season_number", season.to_string()));
        }
        if let Some(episode) = query.episode {
            params.push(("episode_number", episode.to_string()));
        }
        params
    }
}

#[async_trait]
impl SubtitleProvider for OpenSubtitlesClient {
    fn name(&self) -> &'static str {
        "opensubtitles"
    }

    async fn search(&self, query: &SubtitleQuery) -> Result<Vec<SubtitleFile>> {
        let token = self.token().await?;
        let params = Self::search_params(query);
        debug!(?params, "OpenSubtitles search");

        let response: SearchResponse = self
            .client
            .get(format!("{}/subtitles", self.base_url))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .context("OpenSubtitles search request failed")?
            .error_for_status()
            .context("OpenSubtitles search returned error")?
            .json()
            .await
            .context("failed to parse OpenSubtitles search response")?;

        Ok(response
            .data
            .into_iter()
            .flat_map(|item| {
                let language = item.attributes.language;
                item.attributes
                    .files
                    .into_iter()
                    .map(move |file| SubtitleFile {
                        file_id: file.file_id,
                        file_name: file.file_name,
                        language: language.clone(),
                    })
            })
            .collect())
    }

    async fn download(&self, file: &SubtitleFile) -> Result<Vec<u8>> {
        let token = self.token().await?;

        let link: DownloadResponse = self
            .client
            .post(format!("{}/download", self.base_url))
            .bearer_auth(token)
            .json(&DownloadRequest {
                file_id: file.file_id,
            })
            .send()
            .await
            .context("OpenSubtitles download request failed")?
            .error_for_status()
            .context("OpenSubtitles download returned error")?
            .json()
            .await
            .context("failed to parse OpenSubtitles download response")?;

        let bytes = self
            .client
            .get(&link.link)
            .send()
            .await
            .with_context(|| format!("Failed to fetch subtitle from {}", link.link))?
            .error_for_status()
            .with_context(|| format!("HTTP error fetching subtitle from {}", link.link))?
            .bytes()
            .await
            .context("Failed to read subtitle bytes")?;

        Ok(bytes.to_vec())
    }
}
