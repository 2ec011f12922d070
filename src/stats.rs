//! Aggregations over results tables.

use crate::error::{Error, Result};
use crate::table::{BenchmarkTable, NAME, Outcome};
use serde::Serialize;
use std::collections::HashMap;

/// Column sums of the five outcome indicators, indexed by [`Outcome::index`].
pub fn outcome_totals(table: &BenchmarkTable) -> Result<[f64; 5]> {
    let mut totals = [0.0; 5];
    for outcome in Outcome::all() {
        totals[outcome.index()] = table.column_sum(outcome.column())?;
    }
    Ok(totals)
}

/// Share of each outcome in percent. The five shares sum to 100.
pub fn outcome_percentages(table: &BenchmarkTable) -> Result<[f64; 5]> {
    let totals = outcome_totals(table)?;
    let total: f64 = totals.iter().sum();

    if total == 0.0 {
        return Err(Error::EmptyOutcomes(table.source().to_string()));
    }

    Ok(totals.map(|t| t * 100.0 / total))
}

/// Five-number summary plus mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl Summary {
    /// Returns `None` for an empty series. NaN values are ignored.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;

        Some(Self {
            count,
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[count - 1],
            mean,
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Row indices of the same program in two tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub name: String,
    pub left: usize,
    pub right: usize,
}

/// Match rows of `left` with rows of `right` by their `name` column.
///
/// Pairs follow the row order of `left`. When a name occurs more than once
/// in `right`, its first occurrence is used. Unmatched rows are skipped.
pub fn pair_by_name(left: &BenchmarkTable, right: &BenchmarkTable) -> Result<Vec<Pair>> {
    let left_names = left.text_column(NAME)?;
    let right_names = right.text_column(NAME)?;

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(right_names.len());
    for (i, name) in right_names.iter().enumerate() {
        index.entry(*name).or_insert(i);
    }

    Ok(left_names
        .iter()
        .enumerate()
        .filter_map(|(l, name)| {
            index.get(name).map(|&r| Pair {
                name: name.to_string(),
                left: l,
                right: r,
            })
        })
        .collect())
}
