//! DataFrame helpers
//! Typed column extraction and construction shared by the pipeline stages.

use polars::prelude::*;

/// Read a column as optional strings, casting non-string columns.
pub fn string_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Read a column as optional floats. NaN is reported as missing.
pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let values = column
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read a category column as optional collections.
///
/// List columns yield their elements in order; any other column is treated
/// as single-valued and yields one-element collections.
pub fn list_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<Vec<String>>>> {
    let column = df.column(name)?;
    match column.dtype() {
        DataType::List(_) => column
            .list()?
            .into_iter()
            .map(|entry| -> PolarsResult<Option<Vec<String>>> {
                match entry {
                    Some(series) => {
                        let series = series.cast(&DataType::String)?;
                        let values: Vec<String> = series
                            .str()?
                            .into_iter()
                            .flatten()
                            .map(str::to_string)
                            .collect();
                        Ok(Some(values))
                    }
                    None => Ok(None),
                }
            })
            .collect(),
        _ => Ok(string_values(df, name)?
            .into_iter()
            .map(|v| v.map(|s| vec![s]))
            .collect()),
    }
}

/// Whether a column holds collections rather than single values.
pub fn is_list_column(df: &DataFrame, name: &str) -> PolarsResult<bool> {
    Ok(matches!(df.column(name)?.dtype(), DataType::List(_)))
}

/// Build a `List(String)` column; `None` entries become nulls.
pub fn list_column(name: &str, values: &[Option<Vec<String>>]) -> Column {
    let mut builder = ListStringChunkedBuilder::new(name.into(), values.len(), values.len() * 4);
    for value in values {
        match value {
            Some(items) => builder.append_values_iter(items.iter().map(String::as_str)),
            None => builder.append_null(),
        }
    }
    builder.finish().into_series().into()
}

pub fn string_column(name: &str, values: Vec<Option<String>>) -> Column {
    Column::new(name.into(), values)
}

pub fn f64_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::new(name.into(), values)
}

/// Gather rows by position. Indices may repeat, which duplicates rows.
pub fn take_rows(df: &DataFrame, indices: Vec<IdxSize>) -> PolarsResult<DataFrame> {
    let idx = IdxCa::from_vec("idx".into(), indices);
    df.take(&idx)
}

/// Keep rows whose mask entry is true.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    df.filter(&mask)
}

/// Names from `required` that the frame lacks.
pub fn missing_columns<'a>(df: &DataFrame, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|name| df.get_column_index(name).is_none())
        .collect()
}
