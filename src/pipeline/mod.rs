// Processing pipeline — drives a document source through the tokenizer and
// frequency aggregator.

pub mod driver;
pub mod processor;
