//! Output Cache Module
//! Persists pipeline output tables as gzip line-delimited JSON, keyed by the
//! configuration's cache key.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::columns;
use super::frame::{f64_column, f64_values, string_column, string_values};
use super::loader::{read_json_lines, LoaderError};
use crate::config::PipelineConfig;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode cached row: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read cached table: {0}")]
    Loader(#[from] LoaderError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Directory of cached output tables.
#[derive(Debug, Clone)]
pub struct OutputCache {
    dir: PathBuf,
}

impl OutputCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, config: &PipelineConfig) -> PathBuf {
        self.dir.join(format!("{}.json.gz", config.cache_key()))
    }

    /// Load the cached table for `config`, if one was stored.
    pub fn load(&self, config: &PipelineConfig) -> Result<Option<DataFrame>, CacheError> {
        let path = self.path_for(config);
        if !path.exists() {
            return Ok(None);
        }

        let reader = BufReader::new(GzDecoder::new(File::open(&path)?));
        let rows: Vec<Map<String, Value>> = read_json_lines(reader)?;

        let category = config.category.column();
        let rating = config.rating.column();
        let text = |row: &Map<String, Value>, key: &str| {
            row.get(key).and_then(Value::as_str).map(str::to_string)
        };

        let df = DataFrame::new(vec![
            string_column(
                columns::LABEL,
                rows.iter().map(|r| text(r, columns::LABEL)).collect(),
            ),
            string_column(
                columns::PUBLICATION_DATE,
                rows.iter().map(|r| text(r, columns::PUBLICATION_DATE)).collect(),
            ),
            string_column(category, rows.iter().map(|r| text(r, category)).collect()),
            f64_column(
                rating,
                rows.iter()
                    .map(|r| r.get(rating).and_then(Value::as_f64))
                    .collect(),
            ),
        ])?;
        debug!(path = %path.display(), rows = df.height(), "loaded cached table");
        Ok(Some(df))
    }

    /// Store `table` for `config`, replacing any previous entry.
    pub fn store(&self, config: &PipelineConfig, table: &DataFrame) -> Result<PathBuf, CacheError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(config);

        let category = config.category.column();
        let rating = config.rating.column();
        let labels = string_values(table, columns::LABEL)?;
        let dates = string_values(table, columns::PUBLICATION_DATE)?;
        let values = string_values(table, category)?;
        let ratings = f64_values(table, rating)?;

        let mut encoder = GzEncoder::new(BufWriter::new(File::create(&path)?), Compression::default());
        for i in 0..table.height() {
            let mut row = Map::new();
            row.insert(columns::LABEL.to_string(), Value::from(labels[i].clone()));
            row.insert(
                columns::PUBLICATION_DATE.to_string(),
                Value::from(dates[i].clone()),
            );
            row.insert(category.to_string(), Value::from(values[i].clone()));
            row.insert(rating.to_string(), Value::from(ratings[i]));
            serde_json::to_writer(&mut encoder, &row)?;
            encoder.write_all(b"\n")?;
        }
        encoder.finish()?.flush()?;

        debug!(path = %path.display(), rows = table.height(), "stored cached table");
        Ok(path)
    }
}
