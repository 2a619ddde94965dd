//! Per-keyword occurrence counting.

use serde::{Serialize, Serializer};

/// Running occurrence totals per keyword, in first-seen order.
///
/// Counts are literal, case-sensitive, non-overlapping substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendMap {
    entries: Vec<(String, usize)>,
}

impl TrendMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the occurrences of `keyword` in `content` to its running total and
    /// return the new total.
    pub fn accumulate(&mut self, keyword: &str, content: &str) -> usize {
        let found = content.matches(keyword).count();
        match self.entries.iter_mut().find(|(k, _)| k == keyword) {
            Some((_, total)) => {
                *total += found;
                *total
            }
            None => {
                self.entries.push((keyword.to_string(), found));
                found
            }
        }
    }

    pub fn get(&self, keyword: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), *n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes as a map in first-seen order.
impl Serialize for TrendMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, usize)> for TrendMap {
    fn from_iter<I: IntoIterator<Item = (K, usize)>>(iter: I) -> Self {
        let mut map = TrendMap::new();
        for (k, n) in iter {
            let k = k.into();
            match map.entries.iter_mut().find(|(existing, _)| *existing == k) {
                Some((_, total)) => *total += n,
                None => map.entries.push((k, n)),
            }
        }
        map
    }
}
