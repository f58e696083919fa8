//! Poster download into a temporary file.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads poster images over HTTP.
#[derive(Clone)]
pub struct PosterFetcher {
    client: reqwest::Client,
}

impl PosterFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Download `url` chunk by chunk into a new temporary `.jpg` file.
    ///
    /// Any non-2xx status is an error. The file is deleted when the returned
    /// handle is dropped.
    pub async fn download(&self, url: &str) -> Result<NamedTempFile> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download image from {}", url))?
            .error_for_status()
            .with_context(|| format!("HTTP error downloading image from {}", url))?;

        let mut file = tempfile::Builder::new()
            .prefix("cinetag-cover-")
            .suffix(".jpg")
            .tempfile()
            .context("Failed to create temporary cover file")?;

        let mut written = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to read image bytes from {}", url))?
        {
            file.write_all(&chunk)
                .context("Failed to write temporary cover file")?;
            written += chunk.len();
        }
        file.flush().context("Failed to write temporary cover file")?;

        debug!(url, bytes = written, path = %file.path().display(), "Cover downloaded");
        Ok(file)
    }
}
