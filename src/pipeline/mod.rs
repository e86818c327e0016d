//! Pipeline module - from raw movie tables to the influencer comparison table
//!
//! Stages run strictly in sequence and never mutate their inputs:
//! rating join / cleaning, aggregation, influencer selection, filtering,
//! explosion and label resolution.

mod aggregator;
mod cleaner;
mod exploder;
mod filter;
mod joiner;
mod resolver;
mod selector;

pub use aggregator::{aggregate, CategoryStat};
pub use cleaner::{clean_ratio, clean_scores, derive_return, filter_years, publication_year};
pub use exploder::explode;
pub use filter::filter_rows;
pub use joiner::join;
pub use resolver::{resolve, resolve_column, resolve_one, ReferenceTable};
pub use selector::{select, InfluencerSet};

use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Category, ConfigError, PipelineConfig};
use crate::data::columns;
use crate::data::frame::{f64_values, filter_rows as mask_rows, missing_columns, string_values};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("{table} table is missing column '{column}'")]
    MissingColumn { table: &'static str, column: String },
}

/// Immutable input tables of one comparison.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub movies: DataFrame,
    pub ratings: DataFrame,
    pub references: HashMap<Category, ReferenceTable>,
}

impl PipelineInputs {
    pub fn new(movies: DataFrame, ratings: DataFrame) -> Self {
        Self {
            movies,
            ratings,
            references: HashMap::new(),
        }
    }

    pub fn with_reference(mut self, category: Category, table: ReferenceTable) -> Self {
        self.references.insert(category, table);
        self
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Columns `label`, `publication_date`, `<category>`, `<rating>`; one row
    /// per (movie, influencer), category values resolved to labels.
    pub table: DataFrame,
    /// Per-value statistics before support filtering, best first.
    pub statistics: Vec<CategoryStat>,
    pub influencers: InfluencerSet,
}

impl PipelineOutput {
    /// Number of distinct groups left for a comparison.
    pub fn group_count(&self, config: &PipelineConfig) -> PolarsResult<usize> {
        let mut labels: Vec<String> = string_values(&self.table, config.category.column())?
            .into_iter()
            .flatten()
            .collect();
        labels.sort();
        labels.dedup();
        Ok(labels.len())
    }
}

/// Data preparation pipeline bound to its input tables.
pub struct Pipeline<'a> {
    inputs: &'a PipelineInputs,
}

impl<'a> Pipeline<'a> {
    pub fn new(inputs: &'a PipelineInputs) -> Self {
        Self { inputs }
    }

    /// Movie table with the requested rating attached and cleaned.
    pub fn rated_movies(&self, config: &PipelineConfig) -> Result<DataFrame, PipelineError> {
        let rating = config.rating.column();
        let rated = if config.rating.is_ratio() {
            let with_return = derive_return(&self.inputs.movies)?;
            clean_ratio(&with_return, rating, config.ratio_bounds)?
        } else {
            let ratings = clean_scores(&self.inputs.ratings, &config.required_score_columns)?;
            let joined = join(
                &self.inputs.movies,
                &ratings,
                columns::ROTTEN_TOMATOES_ID,
                rating,
            )?;
            // a complete rating row may still lack the requested score when
            // it is not among the required columns
            let keep: Vec<bool> = f64_values(&joined, rating)?
                .into_iter()
                .map(|v| v.is_some())
                .collect();
            mask_rows(&joined, &keep)?
        };
        debug!(rows = rated.height(), rating, "rated movies");

        Ok(filter_years(&rated, config.year_range)?)
    }

    /// Run every stage for one configuration.
    pub fn run(&self, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
        config.validate()?;
        self.check_columns(config)?;

        let category = config.category.column();
        let rating = config.rating.column();

        let rated = self.rated_movies(config)?;
        let statistics = aggregate(&rated, category, rating)?;
        let influencers = select(&statistics, config.min_movies, config.top_k);
        if influencers.is_empty() {
            warn!(
                category,
                min_movies = config.min_movies,
                "no category value meets the minimum movie count"
            );
        }

        let filtered = filter_rows(&rated, category, &influencers)?;
        let exploded = explode(&filtered, category)?;
        let table = match self.inputs.references.get(&config.category) {
            Some(reference) => {
                let resolved = resolve_column(&exploded, category, reference)?;
                let keep: Vec<bool> = string_values(&resolved, category)?
                    .into_iter()
                    .map(|v| v.is_some())
                    .collect();
                mask_rows(&resolved, &keep)?
            }
            None => {
                warn!(category, "no reference table, keeping raw identifiers");
                exploded
            }
        };
        let table = table.select([columns::LABEL, columns::PUBLICATION_DATE, category, rating])?;

        info!(
            key = %config.cache_key(),
            rated = rated.height(),
            values = statistics.len(),
            influencers = influencers.len(),
            rows = table.height(),
            "pipeline complete"
        );

        Ok(PipelineOutput {
            table,
            statistics,
            influencers,
        })
    }

    /// Run one configuration per category in parallel; results follow the
    /// order of `categories`.
    pub fn run_categories(
        &self,
        base: &PipelineConfig,
        categories: &[Category],
    ) -> Vec<(Category, Result<PipelineOutput, PipelineError>)> {
        categories
            .par_iter()
            .map(|&category| {
                let config = PipelineConfig {
                    category,
                    ..base.clone()
                };
                (category, self.run(&config))
            })
            .collect()
    }

    fn check_columns(&self, config: &PipelineConfig) -> Result<(), PipelineError> {
        let mut movie_columns = vec![
            columns::LABEL,
            columns::PUBLICATION_DATE,
            config.category.column(),
        ];
        if config.rating.is_ratio() {
            movie_columns.extend([columns::COST, columns::BOX_OFFICE]);
        } else {
            movie_columns.push(columns::ROTTEN_TOMATOES_ID);
        }
        if let Some(column) = missing_columns(&self.inputs.movies, &movie_columns).first() {
            return Err(PipelineError::MissingColumn {
                table: "movie",
                column: column.to_string(),
            });
        }

        if !config.rating.is_ratio() {
            let rating_columns = [columns::ROTTEN_TOMATOES_ID, config.rating.column()];
            if let Some(column) = missing_columns(&self.inputs.ratings, &rating_columns).first() {
                return Err(PipelineError::MissingColumn {
                    table: "rating",
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}
