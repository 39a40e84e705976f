use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use wordcloud::activator::{activator_for, ActivationFunction};
use wordcloud::cloud::tokenizer::Tokenizer;
use wordcloud::config::Config;
use wordcloud::crawler::client::HttpFetcher;
use wordcloud::crawler::files::DirectorySource;
use wordcloud::crawler::rate_limit::RateLimiter;
use wordcloud::crawler::traits::DocumentSource;
use wordcloud::crawler::web::WebCrawler;
use wordcloud::output::{self, OutputFormat};
use wordcloud::pipeline::driver::{run_on_pool, DEFAULT_POOL_SIZE};
use wordcloud::pipeline::processor::{ProcessorParams, Wordcloud, WordcloudProcessor};

const DEFAULT_TERM: &str = "book";
const DEFAULT_SIZE: usize = 20;

/// wordcloud: crawl the web for a term and list the words that come up most.
///
/// With no arguments, builds a 20-word cloud for "book".
#[derive(Parser)]
#[command(name = "wordcloud", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a word cloud (the default command)
    Cloud(CloudArgs),

    /// Evaluate an activation function
    Activate {
        /// tanh or sigmoid; anything else means sigmoid
        #[arg(long, default_value = "sigmoid")]
        function: String,

        /// Inputs to evaluate (default: -2 -1 0 1 2)
        #[arg(allow_negative_numbers = true)]
        inputs: Vec<f64>,
    },
}

#[derive(Args)]
struct CloudArgs {
    /// Seed term to crawl for
    #[arg(default_value = DEFAULT_TERM)]
    term: String,

    /// Number of words in the cloud
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Crawl depth from the search results (or directory levels with --dir)
    #[arg(long, default_value_t = 1)]
    depth: u32,

    /// Documents tokenized in parallel
    #[arg(long, default_value_t = 5)]
    workers: usize,

    /// Leave out words seen fewer times than this
    #[arg(long, default_value_t = 3)]
    min_count: u64,

    /// Threads in the worker pool that runs the job
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pool_size: usize,

    /// Read documents from this directory instead of crawling the web
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,
}

impl Default for CloudArgs {
    fn default() -> Self {
        let defaults = ProcessorParams::default();
        Self {
            term: DEFAULT_TERM.to_string(),
            size: DEFAULT_SIZE,
            depth: defaults.max_depth,
            workers: defaults.workers,
            min_count: defaults.min_count,
            pool_size: DEFAULT_POOL_SIZE,
            dir: None,
            format: OutputFormat::Plain,
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries only the cloud
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wordcloud=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => run_cloud(CloudArgs::default()),
        Some(Commands::Cloud(args)) => run_cloud(args),
        Some(Commands::Activate { function, inputs }) => {
            let activator = activator_for(ActivationFunction::from_name(&function));
            let inputs = if inputs.is_empty() {
                vec![-2.0, -1.0, 0.0, 1.0, 2.0]
            } else {
                inputs
            };
            for x in inputs {
                println!("{activator}({x}) = {:.6}", activator.activate(x));
            }
            Ok(())
        }
    }
}

/// Run one cloud job on a fixed-size pool and print the result.
fn run_cloud(args: CloudArgs) -> Result<()> {
    let config = Config::load()?;
    let format = args.format;
    let report = run_on_pool(args.pool_size, || build_processor(&args, &config))?;
    output::emit(&report, format)
}

fn build_processor(args: &CloudArgs, config: &Config) -> Result<WordcloudProcessor> {
    let mut tokenizer = Tokenizer::english(config.min_token_len)?;
    if let Some(path) = &config.stop_words_file {
        let added = tokenizer.load_stop_words_file(path)?;
        info!(path = %path.display(), added, "Loaded extra stop words");
    }

    let source: Arc<dyn DocumentSource> = match &args.dir {
        Some(dir) => Arc::new(DirectorySource::new(dir.clone())),
        None => {
            let limiter = Arc::new(RateLimiter::with_min_delay(config.min_delay));
            let fetcher =
                HttpFetcher::new(&config.user_agent, config.request_timeout, limiter)?;
            let crawler = WebCrawler::new(Arc::new(fetcher), &config.search_url, config.crawl_limits())?
                .with_progress(std::io::stderr().is_terminal());
            Arc::new(crawler)
        }
    };

    Ok(WordcloudProcessor::new(
        Wordcloud::new(args.term.clone(), args.size),
        ProcessorParams::new(args.depth, args.workers, args.min_count),
        source,
        tokenizer,
    ))
}
