//! Row Exploder
//! Turns one row with a multi-valued category into one row per value.

use polars::prelude::*;

use crate::data::frame::{list_values, string_column, take_rows};

/// Explode `column`, returning a new frame where the column is single-valued.
///
/// Rows whose value is missing or empty are discarded. Source row order and
/// the order of values within a row are preserved. Fan-out is not capped.
pub fn explode(df: &DataFrame, column: &str) -> PolarsResult<DataFrame> {
    let entries = list_values(df, column)?;

    let mut indices: Vec<IdxSize> = Vec::new();
    let mut values: Vec<Option<String>> = Vec::new();

    for (row, entry) in entries.into_iter().enumerate() {
        let Some(items) = entry else {
            continue;
        };
        for item in items {
            indices.push(row as IdxSize);
            values.push(Some(item));
        }
    }

    let mut out = take_rows(df, indices)?;
    out.with_column(string_column(column, values))?;
    Ok(out)
}
