#![warn(missing_docs)]

//! Summary statistics for meshstat metric tables.
//!
//! Every metric the analyzer produces is eventually reduced to a
//! [`Summary`] of minimum, maximum, median and mean. Integer counts that
//! repeat heavily (triangles per vertex, for instance) can be kept in a
//! [`FrequencyTable`] instead of an expanded list; both give the same
//! summary.
//!
//! # Example
//!
//! ```
//! use meshstat_stats::{FrequencyTable, Summary};
//!
//! let raw = Summary::from_values(&[4.0, 5.0, 4.0, 5.0]).unwrap();
//! let table: FrequencyTable = [4, 5, 4, 5].into_iter().collect();
//! assert_eq!(table.summary().unwrap(), raw);
//! assert_eq!(raw.median, 4.5);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from summarising a dataset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// No values to summarise.
    #[error("dataset is empty")]
    EmptyDataset,

    /// A value was NaN or infinite.
    #[error("dataset contains non-finite value {0}")]
    NonFinite(f64),
}

/// Result type for statistics.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Minimum, maximum, median and mean of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Smallest value.
    pub minimum: f64,
    /// Largest value.
    pub maximum: f64,
    /// Middle value; mean of the two middle values for even lengths.
    pub median: f64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl Summary {
    /// Summarise a list of values.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(StatsError::EmptyDataset);
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(StatsError::NonFinite(bad));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
        };
        Ok(Self {
            minimum: sorted[0],
            maximum: sorted[n - 1],
            median,
            mean: sorted.iter().sum::<f64>() / n as f64,
        })
    }

    /// Summarise integer counts.
    pub fn from_counts<I>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        counts
            .into_iter()
            .map(|c| c as u64)
            .collect::<FrequencyTable>()
            .summary()
    }

    /// `(name, value)` pairs in report order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("minimum", self.minimum),
            ("maximum", self.maximum),
            ("median", self.median),
            ("mean", self.mean),
        ]
    }
}

/// Value → occurrence count for non-negative integer data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    counts: BTreeMap<u64, usize>,
    total: usize,
}

impl FrequencyTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `value`.
    pub fn add(&mut self, value: u64) {
        self.add_many(value, 1);
    }

    /// Record `count` occurrences of `value`.
    pub fn add_many(&mut self, value: u64, count: usize) {
        if count == 0 {
            return;
        }
        *self.counts.entry(value).or_insert(0) += count;
        self.total += count;
    }

    /// Occurrences of `value`.
    pub fn count(&self, value: u64) -> usize {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// Number of recorded occurrences.
    pub fn len(&self) -> usize {
        self.total
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `(value, count)` pairs in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.counts.iter().map(|(&v, &c)| (v, c))
    }

    /// Summary equal to that of the expanded list.
    pub fn summary(&self) -> Result<Summary> {
        let (Some((&minimum, _)), Some((&maximum, _))) =
            (self.counts.first_key_value(), self.counts.last_key_value())
        else {
            return Err(StatsError::EmptyDataset);
        };

        let n = self.total;
        let median = if n % 2 == 1 {
            self.nth(n / 2) as f64
        } else {
            0.5 * (self.nth(n / 2 - 1) as f64 + self.nth(n / 2) as f64)
        };
        let sum: u128 = self
            .counts
            .iter()
            .map(|(&v, &c)| v as u128 * c as u128)
            .sum();

        Ok(Summary {
            minimum: minimum as f64,
            maximum: maximum as f64,
            median,
            mean: sum as f64 / n as f64,
        })
    }

    /// Value at sorted position `k` of the expanded list (`k < len`).
    fn nth(&self, k: usize) -> u64 {
        let mut seen = 0;
        for (&value, &count) in &self.counts {
            seen += count;
            if k < seen {
                return value;
            }
        }
        self.counts.last_key_value().map_or(0, |(&v, _)| v)
    }
}

impl FromIterator<u64> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut table = Self::new();
        for v in iter {
            table.add(v);
        }
        table
    }
}

impl Extend<u64> for FrequencyTable {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}
