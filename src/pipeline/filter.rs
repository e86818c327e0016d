//! Dataset Filter
//! Keeps only rows whose category value touches the influencer set.

use polars::prelude::*;

use super::selector::InfluencerSet;
use crate::data::frame::{
    filter_rows as mask_rows, is_list_column, list_column, list_values, string_values,
};

/// Restrict `category` to values in `influencers`.
///
/// List entries are intersected with the set (order kept) and rows with an
/// empty intersection are dropped. Single-valued rows are kept only when
/// their value is a member. Applying the same set twice changes nothing.
pub fn filter_rows(
    df: &DataFrame,
    category: &str,
    influencers: &InfluencerSet,
) -> PolarsResult<DataFrame> {
    if !is_list_column(df, category)? {
        let keep: Vec<bool> = string_values(df, category)?
            .into_iter()
            .map(|value| value.is_some_and(|v| influencers.contains(&v)))
            .collect();
        return mask_rows(df, &keep);
    }

    let intersected: Vec<Option<Vec<String>>> = list_values(df, category)?
        .into_iter()
        .map(|entry| {
            entry.map(|values| {
                values
                    .into_iter()
                    .filter(|v| influencers.contains(v))
                    .collect::<Vec<String>>()
            })
        })
        .collect();

    let keep: Vec<bool> = intersected
        .iter()
        .map(|entry| entry.as_ref().is_some_and(|values| !values.is_empty()))
        .collect();
    let surviving: Vec<Option<Vec<String>>> = intersected
        .into_iter()
        .zip(&keep)
        .filter_map(|(entry, &kept)| kept.then_some(entry))
        .collect();

    let mut out = mask_rows(df, &keep)?;
    out.with_column(list_column(category, &surviving))?;
    Ok(out)
}
