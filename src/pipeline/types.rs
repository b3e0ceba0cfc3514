//! Values that flow between pipeline stages

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anything that can be counted by the pipeline.
///
/// A record with no meaningful key should return an empty string; that is
/// still a countable bucket.
pub trait GroupKey {
    fn group_key(&self) -> &str;
}

impl GroupKey for String {
    fn group_key(&self) -> &str {
        self
    }
}

impl GroupKey for &'static str {
    fn group_key(&self) -> &str {
        self
    }
}

/// Per-record unit of work emitted by the source stage.
///
/// Normally `{key: 1}`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    counts: HashMap<String, u64>,
}

impl Contribution {
    /// A single occurrence of `key`
    pub fn unit(key: impl Into<String>) -> Self {
        let mut counts = HashMap::with_capacity(1);
        counts.insert(key.into(), 1);
        Self { counts }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

/// Running key -> sum map owned by exactly one task at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    sums: HashMap<String, u64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one contribution into the running sums
    pub fn add(&mut self, contribution: &Contribution) {
        for (key, count) in contribution.iter() {
            match self.sums.get_mut(key) {
                Some(sum) => *sum += count,
                None => {
                    self.sums.insert(key.to_string(), count);
                }
            }
        }
    }

    /// Fold another accumulator into this one, consuming it
    pub fn merge(&mut self, other: Accumulator) {
        for (key, sum) in other.sums {
            *self.sums.entry(key).or_insert(0) += sum;
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.sums.get(key).copied()
    }

    /// Number of distinct keys seen
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Sum over every key
    pub fn total(&self) -> u64 {
        self.sums.values().sum()
    }

    /// Freeze into key-ordered pairs
    pub fn into_result(self) -> AggregateResult {
        let mut pairs: Vec<KeyCount> = self
            .sums
            .into_iter()
            .map(|(key, sum)| KeyCount { key, sum })
            .collect();
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
        AggregateResult { pairs }
    }
}

/// One bucket of the final aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCount {
    pub key: String,
    pub sum: u64,
}

/// Final output of a pipeline run, sorted by key.
///
/// Only built by [`Accumulator::into_result`], which establishes the ordering
/// that lookups rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pairs: Vec<KeyCount>,
}

impl AggregateResult {
    pub fn pairs(&self) -> &[KeyCount] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.pairs
            .binary_search_by(|pair| pair.key.as_str().cmp(key))
            .ok()
            .map(|index| self.pairs[index].sum)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.pairs.iter().map(|pair| pair.sum).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyCount> {
        self.pairs.iter()
    }
}

impl IntoIterator for AggregateResult {
    type Item = KeyCount;
    type IntoIter = std::vec::IntoIter<KeyCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a> IntoIterator for &'a AggregateResult {
    type Item = &'a KeyCount;
    type IntoIter = std::slice::Iter<'a, KeyCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
