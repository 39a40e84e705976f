// wordcloud: crawl documents from a seed term and surface the most frequent words
//
// This is the library root. Each module corresponds to a stage of the
// pipeline; `activator` is a small standalone utility.

pub mod activator;
pub mod cloud;
pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
