//! Outlier / Validity Cleaner
//! Derives the return ratio and drops rows whose rating cannot be trusted.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

use crate::config::{RatioBounds, YearRange};
use crate::data::columns;
use crate::data::frame::{f64_column, f64_values, filter_rows, string_values};

/// Add a `return` column computed as `box_office / cost`.
///
/// The ratio is missing when either input is missing or the cost is zero.
pub fn derive_return(movies: &DataFrame) -> PolarsResult<DataFrame> {
    let costs = f64_values(movies, columns::COST)?;
    let grosses = f64_values(movies, columns::BOX_OFFICE)?;

    let ratios: Vec<Option<f64>> = costs
        .into_iter()
        .zip(grosses)
        .map(|(cost, gross)| match (cost, gross) {
            (Some(cost), Some(gross)) if cost != 0.0 => Some(gross / cost),
            _ => None,
        })
        .collect();

    let mut out = movies.clone();
    out.with_column(f64_column(columns::RETURN, ratios))?;
    Ok(out)
}

/// Keep rows whose ratio is present and within `bounds` (inclusive),
/// ordered by ratio descending.
pub fn clean_ratio(df: &DataFrame, column: &str, bounds: RatioBounds) -> PolarsResult<DataFrame> {
    let keep: Vec<bool> = f64_values(df, column)?
        .into_iter()
        .map(|value| value.is_some_and(|v| bounds.contains(v)))
        .collect();

    let kept = filter_rows(df, &keep)?;
    debug!(
        column,
        dropped = df.height() - kept.height(),
        min = bounds.min,
        max = bounds.max,
        "ratio cleaning"
    );

    kept.sort(
        [column],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_maintain_order(true),
    )
}

/// Drop every row missing a value in any of `required` that the frame has.
pub fn clean_scores(df: &DataFrame, required: &[String]) -> PolarsResult<DataFrame> {
    let mut keep = vec![true; df.height()];
    for name in required {
        if df.get_column_index(name).is_none() {
            continue;
        }
        for (flag, value) in keep.iter_mut().zip(f64_values(df, name)?) {
            *flag &= value.is_some();
        }
    }

    let kept = filter_rows(df, &keep)?;
    debug!(
        dropped = df.height() - kept.height(),
        "score completeness cleaning"
    );
    Ok(kept)
}

/// Year of an ISO date (`YYYY-MM-DD`), an ISO timestamp, or a bare year.
pub fn publication_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date.get(..10).unwrap_or(date), "%Y-%m-%d") {
        return Some(parsed.year());
    }
    if date.len() == 4 {
        return date.parse().ok();
    }
    None
}

/// Keep rows published inside `range`. Without a range the frame is
/// returned untouched, unparsable dates included.
pub fn filter_years(df: &DataFrame, range: Option<YearRange>) -> PolarsResult<DataFrame> {
    let Some(range) = range else {
        return Ok(df.clone());
    };

    let keep: Vec<bool> = string_values(df, columns::PUBLICATION_DATE)?
        .into_iter()
        .map(|date| {
            date.as_deref()
                .and_then(publication_year)
                .is_some_and(|year| range.contains(year))
        })
        .collect();

    let kept = filter_rows(df, &keep)?;
    debug!(
        start = range.start,
        end = range.end,
        dropped = df.height() - kept.height(),
        "year filter"
    );
    Ok(kept)
}
