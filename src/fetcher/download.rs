use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::app::{HarvestError, Result};

/// Configuration for media downloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Scheme given to protocol-relative media URLs (default: "https")
    pub scheme: String,

    /// Connection timeout in seconds (default: 30)
    pub connect_timeout_secs: u64,

    /// User agent string to send
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            connect_timeout_secs: 30,
            user_agent: concat!("vidharvest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Streams media files to disk.
///
/// Only protocol-relative sources (`//host/path`) are supported; players
/// that expose `blob:` or other opaque URLs are reported and skipped. Bytes
/// are written in whatever chunks the transport delivers, not a fixed buffer
/// size. A failure mid-transfer leaves the partial file in place.
pub struct Downloader {
    client: Client,
    scheme: String,
}

impl Downloader {
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            scheme: config.scheme.clone(),
        })
    }

    /// Absolute URL for a media source, or `UnsupportedScheme`.
    pub fn absolute_url(&self, media_url: &str) -> Result<Url> {
        let rest = media_url
            .strip_prefix("//")
            .ok_or_else(|| HarvestError::UnsupportedScheme(media_url.to_string()))?;

        Ok(Url::parse(&format!("{}://{}", self.scheme, rest))?)
    }

    /// Copy the remote bytes of `media_url` into a new file at `dest`.
    ///
    /// Returns the number of bytes written. An existing file at `dest` is
    /// overwritten.
    pub async fn download(&self, media_url: &str, dest: &Path) -> Result<u64> {
        let url = self.absolute_url(media_url)?;

        let mut response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
