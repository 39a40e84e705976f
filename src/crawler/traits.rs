// Document source and page fetcher traits — the swap-ready seams.
//
// The processor only ever sees a DocumentSource, so it doesn't care whether
// documents come from a web crawl, a directory on disk, or a fixed list.
// The web crawler in turn only sees a PageFetcher, which lets tests drive
// it from an in-memory map of pages instead of the network.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use url::Url;

/// One unit of text fed into the word count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Where the text came from (URL or file path)
    pub origin: String,
    /// How many hops from the seed this document was found at
    pub depth: u32,
    pub text: String,
}

impl Document {
    pub fn new(origin: impl Into<String>, depth: u32, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            depth,
            text: text.into(),
        }
    }
}

/// Produces a finite stream of documents for a seed term.
///
/// Implementations push documents into `tx` as they become available and
/// return once the source is exhausted. Dropping `tx` (which happens when the
/// future completes) is what signals end-of-stream to the consumer. If the
/// receiver has gone away, implementations should stop early and return Ok.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Stream documents for `seed`, descending at most `max_depth` levels.
    async fn produce(&self, seed: &str, max_depth: u32, tx: mpsc::Sender<Document>) -> Result<()>;

    /// Short human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// Fetches the HTML body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}
