//! Ranked frames: the keyed snapshot a chart renders for one instant.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::records::Dataset;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: f64,
    /// 0-based position in the frame.
    pub rank: usize,
}

/// Entries ordered by value descending, ties by key ascending. Keys are unique and rank
/// equals index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub year: Option<i32>,
    pub entries: Vec<RankedEntry>,
}

impl Frame {
    /// Rank the top `n` of `items`. Missing and non-finite values are excluded; a key seen
    /// more than once keeps its largest value. The result does not depend on input order.
    pub fn top_n<I, K>(items: I, n: usize) -> Self
    where
        I: IntoIterator<Item = (K, Option<f64>)>,
        K: Into<String>,
    {
        let mut best: HashMap<String, f64> = HashMap::new();
        for (key, value) in items {
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            best.entry(key.into())
                .and_modify(|v| *v = v.max(value))
                .or_insert(value);
        }

        let mut sorted: Vec<(String, f64)> = best.into_iter().collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(n);

        let entries = sorted
            .into_iter()
            .enumerate()
            .map(|(rank, (key, value))| RankedEntry { key, value, rank })
            .collect();
        Self { year: None, entries }
    }

    /// Top `n` entities of `dataset` for `year` by `field`.
    pub fn from_dataset(dataset: &Dataset, year: i32, field: &str, n: usize) -> Self {
        let mut frame = Self::top_n(
            dataset
                .for_year(year)
                .map(|r| (r.entity.as_str(), r.value(field))),
            n,
        );
        frame.year = Some(year);
        frame
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&RankedEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Largest value in the frame; 0 when empty.
    pub fn max_value(&self) -> f64 {
        self.entries.first().map(|e| e.value).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_value_then_key() {
        let f = Frame::top_n(
            vec![
                ("B", Some(5.0)),
                ("A", Some(5.0)),
                ("C", Some(9.0)),
                ("D", None),
                ("E", Some(f64::NAN)),
            ],
            10,
        );
        let keys: Vec<_> = f.keys().collect();
        assert_eq!(keys, vec!["C", "A", "B"]);
        assert_eq!(f.entries.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(f.max_value(), 9.0);
    }

    #[test]
    fn duplicate_keys_keep_largest() {
        let f = Frame::top_n(vec![("A", Some(1.0)), ("A", Some(3.0)), ("B", Some(2.0))], 1);
        assert_eq!(f.len(), 1);
        assert_eq!(f.entries[0].key, "A");
        assert_eq!(f.entries[0].value, 3.0);
    }
}
