// Frequency aggregation — term counts and top-K selection.
//
// A FrequencyTable is built per document by a tokenization worker, then the
// partial tables are merged into one aggregate. Merging only ever adds, so
// counts never decrease during a run.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A (term, count) pair in the final cloud.
///
/// Ordering is rank order: higher counts sort first, and equal counts fall
/// back to ascending lexicographic order of the term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub term: String,
    pub count: u64,
}

impl FrequencyEntry {
    pub fn new(term: impl Into<String>, count: u64) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

impl Ord for FrequencyEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.term.cmp(&other.term))
    }
}

impl PartialOrd for FrequencyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FrequencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term, self.count)
    }
}

/// Term -> count map with a running token total.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `term`.
    pub fn add(&mut self, term: &str) {
        self.add_n(term, 1);
    }

    /// Count `n` occurrences of `term`. Adding zero is a no-op so that no
    /// entry ever holds a zero count.
    pub fn add_n(&mut self, term: &str, n: u64) {
        if n == 0 {
            return;
        }
        match self.counts.get_mut(term) {
            Some(count) => *count += n,
            None => {
                self.counts.insert(term.to_string(), n);
            }
        }
        self.total += n;
    }

    /// Fold another table into this one.
    pub fn merge(&mut self, other: FrequencyTable) {
        if self.counts.is_empty() {
            *self = other;
            return;
        }
        for (term, n) in other.counts {
            *self.counts.entry(term).or_insert(0) += n;
        }
        self.total += other.total;
    }

    pub fn get(&self, term: &str) -> u64 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of tokens counted, duplicates included.
    pub fn total_tokens(&self) -> u64 {
        self.total
    }

    /// The `k` highest-ranked entries with `count >= min_count`, best first.
    ///
    /// Keeps a bounded heap of the current worst-retained entry on top, so
    /// selection is O(n log k) rather than sorting the whole table.
    pub fn top_k(&self, k: usize, min_count: u64) -> Vec<FrequencyEntry> {
        if k == 0 {
            return Vec::new();
        }

        let mut heap: BinaryHeap<FrequencyEntry> = BinaryHeap::with_capacity(k + 1);
        for (term, &count) in &self.counts {
            if count < min_count.max(1) {
                continue;
            }
            let entry = FrequencyEntry::new(term.as_str(), count);
            if heap.len() < k {
                heap.push(entry);
            } else if let Some(worst) = heap.peek() {
                if entry < *worst {
                    heap.pop();
                    heap.push(entry);
                }
            }
        }

        heap.into_sorted_vec()
    }
}

impl<'a> FromIterator<&'a str> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for term in iter {
            table.add(term);
        }
        table
    }
}
