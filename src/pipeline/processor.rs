// Word cloud pipeline: document stream -> tokenize -> aggregate -> top-K.
//
// The source and the tokenizers run concurrently. The source pushes
// documents into a bounded channel; the consumer side pulls them off and
// tokenizes each on a blocking thread, with at most `workers` documents in
// flight. Each worker returns a partial FrequencyTable which is merged into
// the run's aggregate as it completes.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cloud::frequency::{FrequencyEntry, FrequencyTable};
use crate::cloud::tokenizer::Tokenizer;
use crate::crawler::traits::{Document, DocumentSource};

/// What to build a cloud for: the seed term and how many words to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wordcloud {
    pub term: String,
    pub size: usize,
}

impl Wordcloud {
    pub fn new(term: impl Into<String>, size: usize) -> Self {
        Self {
            term: term.into(),
            size,
        }
    }
}

/// Tuning knobs for a processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorParams {
    /// How many levels the source descends from the seed
    pub max_depth: u32,
    /// Documents tokenized concurrently (0 is treated as 1)
    pub workers: usize,
    /// Words seen fewer times than this are left out of the cloud
    pub min_count: u64,
}

impl ProcessorParams {
    pub fn new(max_depth: u32, workers: usize, min_count: u64) -> Self {
        Self {
            max_depth,
            workers,
            min_count,
        }
    }
}

impl Default for ProcessorParams {
    fn default() -> Self {
        Self::new(1, 5, 3)
    }
}

/// The result of a run, with enough context to report on it.
#[derive(Debug, Clone, Serialize)]
pub struct CloudReport {
    pub term: String,
    pub generated_at: DateTime<Utc>,
    pub documents: usize,
    pub distinct_terms: usize,
    pub total_tokens: u64,
    pub entries: Vec<FrequencyEntry>,
}

/// Builds a word cloud from whatever a DocumentSource produces.
pub struct WordcloudProcessor {
    cloud: Wordcloud,
    params: ProcessorParams,
    source: Arc<dyn DocumentSource>,
    tokenizer: Arc<Tokenizer>,
}

impl WordcloudProcessor {
    /// The seed term's own words are added to the tokenizer's stop words,
    /// so a cloud never just repeats its query back.
    pub fn new(
        cloud: Wordcloud,
        params: ProcessorParams,
        source: Arc<dyn DocumentSource>,
        mut tokenizer: Tokenizer,
    ) -> Self {
        tokenizer.extend_stop_words([cloud.term.as_str()]);
        Self {
            cloud,
            params,
            source,
            tokenizer: Arc::new(tokenizer),
        }
    }

    pub fn cloud(&self) -> &Wordcloud {
        &self.cloud
    }

    pub fn params(&self) -> ProcessorParams {
        self.params
    }

    /// Run the pipeline and return the top entries, best first.
    pub async fn process(&self) -> Result<Vec<FrequencyEntry>> {
        Ok(self.process_report().await?.entries)
    }

    /// Run the pipeline and return the entries plus run statistics.
    pub async fn process_report(&self) -> Result<CloudReport> {
        let generated_at = Utc::now();

        if self.cloud.size == 0 {
            return Ok(CloudReport {
                term: self.cloud.term.clone(),
                generated_at,
                documents: 0,
                distinct_terms: 0,
                total_tokens: 0,
                entries: Vec::new(),
            });
        }

        let workers = self.params.workers.max(1);
        let (tx, rx) = mpsc::channel::<Document>(workers * 2);

        info!(
            term = %self.cloud.term,
            source = self.source.name(),
            size = self.cloud.size,
            max_depth = self.params.max_depth,
            workers,
            min_count = self.params.min_count,
            "Processing word cloud"
        );

        let produce = self
            .source
            .produce(&self.cloud.term, self.params.max_depth, tx);
        let consume = aggregate(rx, Arc::clone(&self.tokenizer), workers);

        let (produced, consumed) = tokio::join!(produce, consume);
        produced.with_context(|| format!("Document source {} failed", self.source.name()))?;
        let (table, documents) = consumed?;

        let entries = table.top_k(self.cloud.size, self.params.min_count);

        info!(
            documents,
            distinct_terms = table.len(),
            total_tokens = table.total_tokens(),
            entries = entries.len(),
            "Word cloud complete"
        );

        Ok(CloudReport {
            term: self.cloud.term.clone(),
            generated_at,
            documents,
            distinct_terms: table.len(),
            total_tokens: table.total_tokens(),
            entries,
        })
    }
}

/// Drain `rx`, tokenizing up to `workers` documents at once, and merge the
/// partial counts. Returns the aggregate and the number of documents seen.
async fn aggregate(
    rx: mpsc::Receiver<Document>,
    tokenizer: Arc<Tokenizer>,
    workers: usize,
) -> Result<(FrequencyTable, usize)> {
    let documents = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|doc| (doc, rx))
    });

    documents
        .map(|doc| {
            let tokenizer = Arc::clone(&tokenizer);
            async move {
                let origin = doc.origin;
                let text = doc.text;
                let partial = tokio::task::spawn_blocking(move || tokenizer.count(&text))
                    .await
                    .with_context(|| format!("Tokenizer worker failed on {origin}"))?;
                debug!(origin = %origin, tokens = partial.total_tokens(), "Document tokenized");
                Ok::<_, anyhow::Error>(partial)
            }
        })
        .buffer_unordered(workers)
        .try_fold((FrequencyTable::new(), 0usize), |(mut table, seen), partial| async move {
            table.merge(partial);
            Ok((table, seen + 1))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::memory::StaticSource;

    fn bare_tokenizer() -> Tokenizer {
        Tokenizer::new(Vec::<String>::new(), 1).unwrap()
    }

    #[tokio::test]
    async fn test_tie_break_is_lexicographic() {
        let source = Arc::new(StaticSource::from_texts(["a a b", "b c"]));
        let processor = WordcloudProcessor::new(
            Wordcloud::new("", 2),
            ProcessorParams::new(0, 2, 1),
            source,
            bare_tokenizer(),
        );

        let entries = processor.process().await.unwrap();
        assert_eq!(
            entries,
            vec![FrequencyEntry::new("a", 2), FrequencyEntry::new("b", 2)]
        );
    }

    #[tokio::test]
    async fn test_seed_term_is_excluded() {
        let source = Arc::new(StaticSource::from_texts(["book book book shelf", "book shelf"]));
        let processor = WordcloudProcessor::new(
            Wordcloud::new("Book", 5),
            ProcessorParams::new(0, 1, 1),
            source,
            bare_tokenizer(),
        );

        let entries = processor.process().await.unwrap();
        assert_eq!(entries, vec![FrequencyEntry::new("shelf", 2)]);
    }

    #[tokio::test]
    async fn test_zero_size_short_circuits() {
        let source = Arc::new(StaticSource::from_texts(["anything at all"]));
        let processor = WordcloudProcessor::new(
            Wordcloud::new("x", 0),
            ProcessorParams::default(),
            source,
            bare_tokenizer(),
        );

        let report = processor.process_report().await.unwrap();
        assert!(report.entries.is_empty());
        assert_eq!(report.documents, 0);
    }
}
