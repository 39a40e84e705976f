// Word cloud primitives — tokenization and frequency aggregation.

pub mod frequency;
pub mod tokenizer;
