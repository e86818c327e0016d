//! Rating Joiner
//! Inner join of the movie table with one column of the ratings table.

use polars::prelude::*;
use std::collections::HashMap;

use crate::data::frame::{f64_column, f64_values, string_values, take_rows};

/// Join `ratings[rating_column]` onto `movies` by `key`.
///
/// Movies without a matching rating row are dropped; a null key never
/// matches. Movie order is preserved and a key present several times in
/// the ratings table yields one row per match.
pub fn join(
    movies: &DataFrame,
    ratings: &DataFrame,
    key: &str,
    rating_column: &str,
) -> PolarsResult<DataFrame> {
    let rating_keys = string_values(ratings, key)?;
    let rating_values = f64_values(ratings, rating_column)?;

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, rating_key) in rating_keys.into_iter().enumerate() {
        if let Some(rating_key) = rating_key {
            index.entry(rating_key).or_default().push(row);
        }
    }

    let mut movie_rows: Vec<IdxSize> = Vec::new();
    let mut joined: Vec<Option<f64>> = Vec::new();
    for (row, movie_key) in string_values(movies, key)?.into_iter().enumerate() {
        let Some(matches) = movie_key.as_ref().and_then(|k| index.get(k)) else {
            continue;
        };
        for &rating_row in matches {
            movie_rows.push(row as IdxSize);
            joined.push(rating_values[rating_row]);
        }
    }

    let mut out = take_rows(movies, movie_rows)?;
    out.with_column(f64_column(rating_column, joined))?;
    Ok(out)
}
