//! Descriptive statistics reported as compact JSON.
//!
//! Model diagnostics are summarized per column with [`Column::describe`] and
//! rounded with [`Summary::to_rounded`] before they are serialized, which keeps
//! the reports small and diff-friendly.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, ser::SerializeMap};

use super::frame::{Column, Frame};

/// Labelled statistics in a fixed order.
///
/// Serializes as a JSON object whose keys follow insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    entries: Vec<(String, f64)>,
}

impl Summary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the statistic `label`, replacing any previous value.
    pub fn set(&mut self, label: impl Into<String>, value: f64) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, v)) => *v = value,
            None => self.entries.push((label, value)),
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    /// Returns a copy with every value rounded to `ndigits` decimal places.
    #[must_use]
    pub fn to_rounded(&self, ndigits: u32) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(l, v)| (l.clone(), round_to(*v, ndigits)))
                .collect(),
        }
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for Summary {
    fn from_iter<I: IntoIterator<Item = (L, f64)>>(iter: I) -> Self {
        let mut summary = Self::new();
        for (label, value) in iter {
            summary.set(label, value);
        }
        summary
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Rounds every summary in a per-column map.
///
/// The result serializes as `{column: {statistic: value}}`.
#[must_use]
pub fn summaries_to_rounded(
    summaries: &BTreeMap<String, Summary>,
    ndigits: u32,
) -> BTreeMap<String, Summary> {
    summaries
        .iter()
        .map(|(column, summary)| (column.clone(), summary.to_rounded(ndigits)))
        .collect()
}

/// Past this many decimal places every `f64` prints exactly.
const EXACT_DECIMALS: usize = 1100;

/// Rounds the exact binary value of `value`, breaking ties to even.
fn round_to(value: f64, ndigits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let precision = usize::try_from(ndigits).map_or(EXACT_DECIMALS, |n| n.min(EXACT_DECIMALS));
    format!("{value:.precision$}").parse().unwrap_or(value)
}

impl Column {
    /// Computes `count`, `mean`, `std`, `min`, `25%`, `50%`, `75%`, and `max`.
    ///
    /// `NaN` values are skipped. The standard deviation uses `n - 1` degrees of
    /// freedom and percentiles interpolate linearly. Statistics that are
    /// undefined for the remaining values are `NaN`. Text columns yield `None`.
    #[must_use]
    pub fn describe(&self) -> Option<Summary> {
        let mut values: Vec<f64> = self.to_f64()?.into_iter().filter(|v| !v.is_nan()).collect();
        values.sort_by(f64::total_cmp);

        let n = values.len();
        let count = n as f64;

        let mean = if n == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count
        };
        let std = if n < 2 {
            f64::NAN
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1.0)).sqrt()
        };

        Some(Summary::from_iter([
            ("count", count),
            ("mean", mean),
            ("std", std),
            ("min", values.first().copied().unwrap_or(f64::NAN)),
            ("25%", percentile(&values, 0.25)),
            ("50%", percentile(&values, 0.5)),
            ("75%", percentile(&values, 0.75)),
            ("max", values.last().copied().unwrap_or(f64::NAN)),
        ]))
    }
}

/// Linear interpolation between closest ranks of sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - pos.floor();
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

impl Frame {
    /// Describes every numeric column, keyed by column name.
    #[must_use]
    pub fn describe(&self) -> BTreeMap<String, Summary> {
        self.columns()
            .filter_map(|(name, column)| Some((name.to_owned(), column.describe()?)))
            .collect()
    }
}
