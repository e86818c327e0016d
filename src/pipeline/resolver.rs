//! Reference Resolver
//! Replaces category identifiers with their canonical labels.

use polars::prelude::*;
use std::collections::HashMap;

use crate::data::frame::{is_list_column, list_column, list_values, string_column, string_values};

/// Identifier to label lookup for one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    labels: HashMap<String, String>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping unless the identifier is already known.
    /// Returns false when the identifier was a duplicate.
    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) -> bool {
        match self.labels.entry(id.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(label.into());
                true
            }
        }
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReferenceTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = ReferenceTable::new();
        for (id, label) in iter {
            table.insert(id, label);
        }
        table
    }
}

/// Resolve one identifier; unmapped identifiers are absent.
pub fn resolve_one(value: &str, reference: &ReferenceTable) -> Option<String> {
    reference.label(value).map(str::to_string)
}

/// Resolve a collection of identifiers, dropping unmapped ones.
///
/// An empty result is reported as `None` so callers see a single
/// "missing" state instead of an empty collection.
pub fn resolve(values: &[String], reference: &ReferenceTable) -> Option<Vec<String>> {
    let labels: Vec<String> = values
        .iter()
        .filter_map(|value| resolve_one(value, reference))
        .collect();
    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}

/// Resolve every entry of `column`, returning a new frame.
///
/// The column keeps its shape: list columns stay lists, single-valued
/// columns stay single-valued. Entries that resolve to nothing become null.
pub fn resolve_column(
    df: &DataFrame,
    column: &str,
    reference: &ReferenceTable,
) -> PolarsResult<DataFrame> {
    let resolved = if is_list_column(df, column)? {
        let values: Vec<Option<Vec<String>>> = list_values(df, column)?
            .into_iter()
            .map(|entry| entry.and_then(|ids| resolve(&ids, reference)))
            .collect();
        list_column(column, &values)
    } else {
        let values: Vec<Option<String>> = string_values(df, column)?
            .into_iter()
            .map(|entry| entry.and_then(|id| resolve_one(&id, reference)))
            .collect();
        string_column(column, values)
    };

    let mut out = df.clone();
    out.with_column(resolved)?;
    Ok(out)
}
