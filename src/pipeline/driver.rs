// Job driver: one word cloud job on a fixed-size worker pool.
//
// The processor is built and run as a single task spawned onto a dedicated
// multi-threaded runtime, and the calling thread blocks until it finishes.
// A panic or cancellation inside the task surfaces as an error.

use anyhow::{Context, Result};
use tracing::debug;

use super::processor::{CloudReport, WordcloudProcessor};

/// Threads in the pool when nothing else is configured.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Name given to every pool thread.
pub const POOL_THREAD_NAME: &str = "wordcloud-worker";

/// Build a processor on a pool of `pool_size` threads (0 means 1), run it as
/// one task and block until its report is ready.
///
/// `build` runs inside the pool so sources that need a live runtime can be
/// constructed there.
pub fn run_on_pool<F>(pool_size: usize, build: F) -> Result<CloudReport>
where
    F: FnOnce() -> Result<WordcloudProcessor>,
{
    let threads = pool_size.max(1);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .thread_name(POOL_THREAD_NAME)
        .enable_all()
        .build()
        .context("Failed to start worker pool")?;

    debug!(threads, "Worker pool started");

    runtime.block_on(async move {
        let processor = build()?;
        let job = tokio::spawn(async move { processor.process_report().await });
        job.await.context("Word cloud task did not complete")?
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cloud::tokenizer::Tokenizer;
    use crate::crawler::memory::StaticSource;
    use crate::pipeline::processor::{ProcessorParams, Wordcloud};

    #[test]
    fn test_build_failure_propagates() {
        let err = run_on_pool(2, || Err(anyhow::anyhow!("no source configured"))).unwrap_err();
        assert!(err.to_string().contains("no source configured"));
    }

    #[test]
    fn test_zero_pool_size_still_runs() {
        let report = run_on_pool(0, || {
            Ok(WordcloudProcessor::new(
                Wordcloud::new("", 1),
                ProcessorParams::new(0, 1, 1),
                Arc::new(StaticSource::from_texts(["quill quill ink"])),
                Tokenizer::new(Vec::<String>::new(), 1)?,
            ))
        })
        .unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].term, "quill");
    }
}
