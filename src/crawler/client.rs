// HTTP page client — a thin reqwest wrapper behind the PageFetcher trait.
//
// All requests go through the shared rate limiter and the 429/503 retry
// wrapper. Only HTML (or untyped) text responses are accepted; anything else
// is reported as an error so the crawler can skip it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use super::rate_limit::{with_retry, HttpStatusError, RateLimiter};
use super::traits::PageFetcher;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "wordcloud/0.1 (+text-frequency crawler)";

/// Responses larger than this are truncated before parsing.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// reqwest-backed page fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl HttpFetcher {
    /// Build a fetcher with the given user agent and per-request timeout.
    pub fn new(user_agent: &str, timeout: Duration, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, limiter })
    }

    async fn get_once(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,text/plain;q=0.8")
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::Error::new(HttpStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            }));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_textual(content_type) {
                anyhow::bail!("{url} is not a text page ({content_type})");
            }
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {url}"))?;
        let body = &bytes[..bytes.len().min(MAX_BODY_BYTES)];

        Ok(String::from_utf8_lossy(body).into_owned())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        with_retry(&self.limiter, || self.get_once(url)).await
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/xhtml+xml"
}
