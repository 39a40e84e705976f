// Fixed, in-memory document source.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::traits::{Document, DocumentSource};

/// Replays a fixed list of documents on every run.
///
/// Depth filtering still applies: documents deeper than `max_depth` are
/// not produced.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: Vec<Document>,
}

impl StaticSource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Build a source from plain texts, all at depth 0.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let documents = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Document::new(format!("memory:{i}"), 0, text))
            .collect();
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn produce(&self, _seed: &str, max_depth: u32, tx: mpsc::Sender<Document>) -> Result<()> {
        for doc in self.documents.iter().filter(|d| d.depth <= max_depth) {
            if tx.send(doc.clone()).await.is_err() {
                break;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
