use crate::config::ScraperConfig;
use anyhow::{Context, Result, bail};
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// One pooled client shared by every request of a crawl.
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// Fetch a URL and return the body bytes untouched. Any non-2xx is an error; no retry.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request error for {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP error {} for {}", status, url);
        }

        let body = resp
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        Ok(body.to_vec())
    }
}
