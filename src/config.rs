use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cloud::tokenizer::DEFAULT_MIN_TOKEN_LEN;
use crate::crawler::client::DEFAULT_USER_AGENT;
use crate::crawler::web::{CrawlLimits, DEFAULT_SEARCH_URL};

/// Crawl and tokenizer settings loaded from environment variables.
///
/// Everything has a default, so a bare `wordcloud` run needs no setup. A
/// `.env` file in the working directory is loaded at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Search endpoint; the seed term is appended as `q`
    pub search_url: String,
    pub user_agent: String,
    /// Cap on documents fetched per run
    pub max_pages: usize,
    /// Links followed from each page
    pub links_per_page: usize,
    /// Concurrent page fetches
    pub fetch_concurrency: usize,
    pub request_timeout: Duration,
    /// Minimum gap between two requests
    pub min_delay: Duration,
    pub min_token_len: usize,
    /// Optional file of extra stop words, one per line
    pub stop_words_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let limits = CrawlLimits::default();
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: limits.max_pages,
            links_per_page: limits.links_per_page,
            fetch_concurrency: limits.fetch_concurrency,
            request_timeout: Duration::from_secs(10),
            min_delay: Duration::from_millis(250),
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            stop_words_file: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            search_url: get("WORDCLOUD_SEARCH_URL").unwrap_or(defaults.search_url),
            user_agent: get("WORDCLOUD_USER_AGENT").unwrap_or(defaults.user_agent),
            max_pages: parse_or(get("WORDCLOUD_MAX_PAGES"), "WORDCLOUD_MAX_PAGES", defaults.max_pages)?,
            links_per_page: parse_or(
                get("WORDCLOUD_LINKS_PER_PAGE"),
                "WORDCLOUD_LINKS_PER_PAGE",
                defaults.links_per_page,
            )?,
            fetch_concurrency: parse_or(
                get("WORDCLOUD_FETCH_CONCURRENCY"),
                "WORDCLOUD_FETCH_CONCURRENCY",
                defaults.fetch_concurrency,
            )?,
            request_timeout: Duration::from_secs(parse_or(
                get("WORDCLOUD_REQUEST_TIMEOUT_SECS"),
                "WORDCLOUD_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            min_delay: Duration::from_millis(parse_or(
                get("WORDCLOUD_MIN_DELAY_MS"),
                "WORDCLOUD_MIN_DELAY_MS",
                defaults.min_delay.as_millis() as u64,
            )?),
            min_token_len: parse_or(
                get("WORDCLOUD_MIN_TOKEN_LEN"),
                "WORDCLOUD_MIN_TOKEN_LEN",
                defaults.min_token_len,
            )?,
            stop_words_file: get("WORDCLOUD_STOPWORDS_FILE").map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch_concurrency == 0 {
            anyhow::bail!("WORDCLOUD_FETCH_CONCURRENCY must be at least 1");
        }
        if self.request_timeout.is_zero() {
            anyhow::bail!("WORDCLOUD_REQUEST_TIMEOUT_SECS must be at least 1");
        }
        if self.min_token_len == 0 {
            anyhow::bail!("WORDCLOUD_MIN_TOKEN_LEN must be at least 1");
        }
        Ok(())
    }

    /// Crawl limits derived from this configuration.
    pub fn crawl_limits(&self) -> CrawlLimits {
        CrawlLimits {
            max_pages: self.max_pages,
            links_per_page: self.links_per_page,
            fetch_concurrency: self.fetch_concurrency,
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.min_token_len, 2);
        assert!(config.stop_words_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("WORDCLOUD_MAX_PAGES", "7"),
            ("WORDCLOUD_MIN_DELAY_MS", "0"),
            ("WORDCLOUD_STOPWORDS_FILE", "/tmp/stop.txt"),
        ]))
        .unwrap();
        assert_eq!(config.max_pages, 7);
        assert_eq!(config.min_delay, Duration::ZERO);
        assert_eq!(config.stop_words_file, Some(PathBuf::from("/tmp/stop.txt")));
    }

    #[test]
    fn test_bad_number_names_variable() {
        let err = Config::from_lookup(lookup(&[("WORDCLOUD_MAX_PAGES", "lots")])).unwrap_err();
        assert!(err.to_string().contains("WORDCLOUD_MAX_PAGES"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Config::from_lookup(lookup(&[("WORDCLOUD_FETCH_CONCURRENCY", "0")])).is_err());
    }
}
