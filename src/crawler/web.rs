// Breadth-first web crawl starting from a search-results page.
//
// Level 0 is the search engine's results page for the seed term. Its links
// (minus links back into the search engine) form level 1. Each further level
// is built from the links of the level before, until `max_depth` is reached,
// the frontier runs dry, or `max_pages` documents have been produced.
//
// Pages within a level are fetched concurrently. A page that fails to fetch
// is logged and skipped; only a failure on the results page itself aborts the
// crawl, since without it there is nothing to crawl.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use super::html;
use super::traits::{Document, DocumentSource, PageFetcher};

/// Default search endpoint; the seed is sent as the `q` query parameter.
pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// Limits for a single crawl.
#[derive(Debug, Clone)]
pub struct CrawlLimits {
    /// Stop after producing this many documents
    pub max_pages: usize,
    /// Follow at most this many links from each page
    pub links_per_page: usize,
    /// Fetch at most this many pages at once
    pub fetch_concurrency: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_pages: 50,
            links_per_page: 10,
            fetch_concurrency: 4,
        }
    }
}

/// Crawls the web for documents about a seed term.
pub struct WebCrawler {
    fetcher: Arc<dyn PageFetcher>,
    search_url: Url,
    /// The engine's parent domain; any host at or under it is the engine's own
    engine_domain: Option<String>,
    limits: CrawlLimits,
    show_progress: bool,
}

/// What a fetched page contributes: its text and the links worth following.
struct ParsedPage {
    text: String,
    links: Vec<Url>,
}

impl WebCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, search_url: &str, limits: CrawlLimits) -> Result<Self> {
        let search_url = Url::parse(search_url)
            .with_context(|| format!("Invalid search URL: {search_url}"))?;
        let engine_domain = search_url.domain().map(|d| parent_domain(d).to_string());
        Ok(Self {
            fetcher,
            search_url,
            engine_domain,
            limits,
            show_progress: false,
        })
    }

    /// Draw a spinner on stderr while crawling.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// The results-page URL for a seed term.
    pub fn search_url_for(&self, seed: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair("q", seed.trim());
        url
    }

    /// True for links back into the search engine, including its sibling
    /// subdomains (`html.duckduckgo.com` also owns `duckduckgo.com`).
    pub fn is_search_engine(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        match &self.engine_domain {
            Some(domain) => {
                host == domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
            None => Some(host) == self.search_url.host_str(),
        }
    }

    /// Keep links that leave the engine and haven't been queued before, up
    /// to the per-page limit.
    fn fresh_links(&self, links: Vec<Url>, visited: &mut HashSet<String>) -> Vec<Url> {
        links
            .into_iter()
            .filter(|u| !self.is_search_engine(u))
            .filter(|u| visited.insert(u.as_str().to_string()))
            .take(self.limits.links_per_page)
            .collect()
    }

    /// How many raw links to pull from a page. Over-fetch so that dropping
    /// engine links and already-visited pages still leaves a full quota.
    fn link_budget(&self) -> usize {
        self.limits.links_per_page.saturating_mul(4)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} Crawling {msg}") {
            pb.set_style(style);
        }
        pb
    }
}

/// The last two labels of a host name (`html.duckduckgo.com` -> `duckduckgo.com`).
fn parent_domain(host: &str) -> &str {
    let mut dots = host.rmatch_indices('.');
    dots.next();
    match dots.next() {
        Some((i, _)) => &host[i + 1..],
        None => host,
    }
}

/// Parse a page off the async workers; HTML documents can run to megabytes.
async fn parse_page(body: String, base: Url, link_limit: usize) -> Result<ParsedPage> {
    tokio::task::spawn_blocking(move || ParsedPage {
        text: html::extract_text(&body),
        links: html::extract_links(&body, &base, link_limit),
    })
    .await
    .context("HTML parser task failed")
}

#[async_trait]
impl DocumentSource for WebCrawler {
    async fn produce(&self, seed: &str, max_depth: u32, tx: mpsc::Sender<Document>) -> Result<()> {
        let results_url = self.search_url_for(seed);
        info!(seed, url = %results_url, max_depth, "Starting crawl");

        let results_page = self
            .fetcher
            .fetch(&results_url)
            .await
            .with_context(|| format!("Failed to fetch search results for {seed:?}"))?;

        if max_depth == 0 {
            let parsed = parse_page(results_page, results_url.clone(), 0).await?;
            let _ = tx.send(Document::new(results_url.as_str(), 0, parsed.text)).await;
            return Ok(());
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(results_url.as_str().to_string());

        let parsed = parse_page(results_page, results_url.clone(), self.link_budget()).await?;
        let mut frontier = self.fresh_links(parsed.links, &mut visited);

        debug!(links = frontier.len(), "Search results parsed");

        let pb = self.progress_bar();
        let mut produced = 0usize;
        let mut failed = 0usize;

        'levels: for depth in 1..=max_depth {
            if frontier.is_empty() {
                break;
            }
            let remaining = self.limits.max_pages.saturating_sub(produced);
            if remaining == 0 {
                break;
            }
            frontier.truncate(remaining);

            info!(depth, pages = frontier.len(), "Crawling level");
            let fetcher = &self.fetcher;
            let link_limit = if depth < max_depth { self.link_budget() } else { 0 };
            let level = std::mem::take(&mut frontier);
            let mut pages = stream::iter(level.into_iter().map(|url| async move {
                let result = match fetcher.fetch(&url).await {
                    Ok(body) => parse_page(body, url.clone(), link_limit).await,
                    Err(e) => Err(e),
                };
                (url, result)
            }))
            .buffer_unordered(self.limits.fetch_concurrency.max(1));

            let mut next_level: Vec<Url> = Vec::new();

            while let Some((url, result)) = pages.next().await {
                let page = match result {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(url = %url, error = %e, "Failed to fetch page, skipping");
                        failed += 1;
                        continue;
                    }
                };

                next_level.extend(self.fresh_links(page.links, &mut visited));

                if page.text.is_empty() {
                    continue;
                }

                pb.set_message(url.to_string());
                pb.tick();

                if tx.send(Document::new(url.as_str(), depth, page.text)).await.is_err() {
                    debug!("Document consumer went away, stopping crawl");
                    break 'levels;
                }
                produced += 1;
                if produced >= self.limits.max_pages {
                    break 'levels;
                }
            }

            frontier = next_level;
        }

        pb.finish_and_clear();
        info!(documents = produced, failed, "Crawl complete");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "web"
    }
}
