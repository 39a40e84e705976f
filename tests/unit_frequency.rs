// Unit tests for frequency aggregation and the tokenizer.
//
// Covers FrequencyTable merge/top-K invariants (distinct terms, rank order,
// monotonic counts) and tokenizer normalization edge cases.

use std::collections::HashSet;
use std::io::Write;

use wordcloud::cloud::frequency::{FrequencyEntry, FrequencyTable};
use wordcloud::cloud::tokenizer::{Tokenizer, DEFAULT_MIN_TOKEN_LEN};

// ============================================================
// FrequencyTable::top_k
// ============================================================

#[test]
fn top_k_empty_table() {
    let table = FrequencyTable::new();
    assert!(table.top_k(10, 1).is_empty());
}

#[test]
fn top_k_zero_k() {
    let table: FrequencyTable = "a b c".split(' ').collect();
    assert!(table.top_k(0, 1).is_empty());
}

#[test]
fn top_k_shorter_than_k_when_few_terms() {
    let table: FrequencyTable = "a b b".split(' ').collect();
    let top = table.top_k(20, 1);
    assert_eq!(top, vec![FrequencyEntry::new("b", 2), FrequencyEntry::new("a", 1)]);
}

#[test]
fn top_k_ties_break_lexicographically() {
    let table: FrequencyTable = "pear apple fig fig apple pear".split(' ').collect();
    let terms: Vec<String> = table.top_k(3, 1).into_iter().map(|e| e.term).collect();
    assert_eq!(terms, vec!["apple", "fig", "pear"]);
}

#[test]
fn top_k_tie_at_cutoff_keeps_lexicographically_first() {
    let table: FrequencyTable = "zeta alpha mid mid".split(' ').collect();
    let top = table.top_k(2, 1);
    assert_eq!(top, vec![FrequencyEntry::new("mid", 2), FrequencyEntry::new("alpha", 1)]);
}

#[test]
fn top_k_terms_are_distinct_and_sorted() {
    let text = "one two two three three three four four four four five five five five five";
    let table: FrequencyTable = text.split(' ').collect();
    let top = table.top_k(4, 1);

    let unique: HashSet<&str> = top.iter().map(|e| e.term.as_str()).collect();
    assert_eq!(unique.len(), top.len());

    let mut sorted = top.clone();
    sorted.sort();
    assert_eq!(top, sorted);
    assert_eq!(top[0], FrequencyEntry::new("five", 5));
}

#[test]
fn top_k_min_count_zero_behaves_like_one() {
    let table: FrequencyTable = "a b".split(' ').collect();
    assert_eq!(table.top_k(5, 0), table.top_k(5, 1));
}

// ============================================================
// FrequencyTable::merge
// ============================================================

#[test]
fn merge_never_decreases_counts() {
    let mut aggregate = FrequencyTable::new();
    let partials = ["red green", "green blue blue", "red"];

    let mut previous: Vec<(String, u64)> = Vec::new();
    for text in partials {
        aggregate.merge(text.split(' ').collect());
        for (term, count) in &previous {
            assert!(aggregate.get(term) >= *count, "{term} decreased");
        }
        previous = ["red", "green", "blue"]
            .iter()
            .map(|t| (t.to_string(), aggregate.get(t)))
            .collect();
    }

    assert_eq!(aggregate.get("red"), 2);
    assert_eq!(aggregate.get("green"), 2);
    assert_eq!(aggregate.get("blue"), 2);
    assert_eq!(aggregate.total_tokens(), 6);
}

#[test]
fn merge_into_empty_takes_other() {
    let mut aggregate = FrequencyTable::new();
    aggregate.merge("x x y".split(' ').collect());
    assert_eq!(aggregate.get("x"), 2);
    assert_eq!(aggregate.len(), 2);
}

#[test]
fn entry_display_is_term_then_count() {
    assert_eq!(FrequencyEntry::new("library", 12).to_string(), "library 12");
}

// ============================================================
// Tokenizer
// ============================================================

#[test]
fn tokenizer_default_min_len_drops_single_letters() {
    let tok = Tokenizer::new(Vec::<String>::new(), DEFAULT_MIN_TOKEN_LEN).unwrap();
    assert_eq!(tok.tokenize("I saw a cat"), vec!["saw", "cat"]);
}

#[test]
fn tokenizer_zero_min_len_is_clamped() {
    let tok = Tokenizer::new(Vec::<String>::new(), 0).unwrap();
    assert_eq!(tok.min_len(), 1);
    assert_eq!(tok.tokenize("a b"), vec!["a", "b"]);
}

#[test]
fn tokenizer_handles_unicode_words() {
    let tok = Tokenizer::new(Vec::<String>::new(), 2).unwrap();
    assert_eq!(tok.tokenize("Café NAÏVE über—straße"), vec!["café", "naïve", "über", "straße"]);
}

#[test]
fn tokenizer_english_removes_common_words() {
    let tok = Tokenizer::english(2).unwrap();
    assert!(tok.is_stop_word("the"));
    assert!(tok.is_stop_word("and"));
    assert!(!tok.is_stop_word("library"));
}

#[test]
fn tokenizer_count_matches_tokenize() {
    let tok = Tokenizer::new(Vec::<String>::new(), 2).unwrap();
    let text = "paper paper ink quill ink paper";
    let table = tok.count(text);
    assert_eq!(table.get("paper"), 3);
    assert_eq!(table.get("ink"), 2);
    assert_eq!(table.total_tokens(), tok.tokenize(text).len() as u64);
}

#[test]
fn tokenizer_loads_stop_words_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# publishing noise").unwrap();
    writeln!(file, "ISBN").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "  paperback  ").unwrap();

    let mut tok = Tokenizer::new(Vec::<String>::new(), 2).unwrap();
    let added = tok.load_stop_words_file(file.path()).unwrap();

    assert_eq!(added, 2);
    assert_eq!(tok.tokenize("ISBN paperback novel"), vec!["novel"]);
}

#[test]
fn tokenizer_missing_stop_words_file_errors() {
    let mut tok = Tokenizer::new(Vec::<String>::new(), 2).unwrap();
    let err = tok
        .load_stop_words_file(std::path::Path::new("/definitely/not/here.txt"))
        .unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.txt"));
}
