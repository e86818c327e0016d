//! Group Summary Module
//! Descriptive statistics of the rating per influencer group, as reported
//! next to a comparison.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;

use crate::data::frame::{f64_values, string_values};

/// Descriptive statistics for one group of the output table.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p05: f64,
    pub p95: f64,
}

impl GroupSummary {
    /// Summarize a sample. Empty samples yield NaN statistics.
    pub fn from_values(group: &str, values: &[f64]) -> Self {
        let n = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            group: group.to_string(),
            count: n,
            mean: values.iter().mean(),
            median: interpolated(&sorted, 0.5),
            // sample deviation; single observations have no spread
            std: if n > 1 { values.iter().std_dev() } else { 0.0 },
            p05: interpolated(&sorted, 0.05),
            p95: interpolated(&sorted, 0.95),
        }
    }
}

/// Quantile `q` in `[0, 1]` of an ascending sample, interpolating between
/// neighbours the way NumPy's default does.
fn interpolated(sorted: &[f64], q: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return f64::NAN;
    };
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    match sorted.get(below + 1) {
        Some(&above) => sorted[below] + (above - sorted[below]) * (position - below as f64),
        None => last,
    }
}

/// Ratings of one group in the output table.
pub fn values_for_group(df: &DataFrame, category: &str, rating: &str, group: &str) -> Vec<f64> {
    df.clone()
        .lazy()
        .filter(col(category).eq(lit(group)))
        .select([col(rating).cast(DataType::Float64)])
        .collect()
        .ok()
        .and_then(|df| f64_values(&df, rating).ok())
        .map(|values| values.into_iter().flatten().collect())
        .unwrap_or_default()
}

/// Summaries for every group of `category`, computed in parallel and
/// ordered by mean descending (group name on ties).
pub fn summarize(df: &DataFrame, category: &str, rating: &str) -> PolarsResult<Vec<GroupSummary>> {
    let mut groups: Vec<String> = string_values(df, category)?
        .into_iter()
        .flatten()
        .collect();
    groups.sort();
    groups.dedup();

    let mut summaries: Vec<GroupSummary> = groups
        .par_iter()
        .map(|group| {
            let values = values_for_group(df, category, rating, group);
            GroupSummary::from_values(group, &values)
        })
        .collect();

    summaries.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.group.cmp(&b.group)));
    Ok(summaries)
}
