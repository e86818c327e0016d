//! Category Aggregator
//! Mean rating and movie count per category value.

use polars::prelude::*;
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::exploder::explode;
use crate::data::frame::{f64_values, string_values};

/// Aggregate statistic for one category value.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub value: String,
    pub mean: f64,
    pub count: usize,
}

/// Order by mean descending, then by value so ties are reproducible.
pub fn rank_order(a: &CategoryStat, b: &CategoryStat) -> Ordering {
    b.mean
        .total_cmp(&a.mean)
        .then_with(|| a.value.cmp(&b.value))
}

/// Explode `category` and compute the mean of `rating` per value.
///
/// A movie carrying several values contributes once to each of them.
/// Rows with a missing rating do not contribute.
pub fn aggregate(df: &DataFrame, category: &str, rating: &str) -> PolarsResult<Vec<CategoryStat>> {
    let exploded = explode(df, category)?;
    let values = string_values(&exploded, category)?;
    let ratings = f64_values(&exploded, rating)?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (value, score) in values.into_iter().zip(ratings) {
        if let (Some(value), Some(score)) = (value, score) {
            groups.entry(value).or_default().push(score);
        }
    }

    let mut stats: Vec<CategoryStat> = groups
        .into_iter()
        .map(|(value, scores)| CategoryStat {
            count: scores.len(),
            mean: scores.iter().mean(),
            value,
        })
        .collect();
    stats.sort_by(rank_order);
    Ok(stats)
}
