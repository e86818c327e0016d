//! Line-delimited JSON Loader Module
//! Reads the movie, rating and reference tables (optionally gzip-compressed)
//! and builds the frames the pipeline consumes.

use flate2::read::GzDecoder;
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use super::columns;
use super::frame::{f64_column, list_column, string_column};
use crate::pipeline::ReferenceTable;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed record on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to build table: {0}")]
    Polars(#[from] PolarsError),
}

/// A category field holding either one identifier or several.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// One line of the movie table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieRecord {
    pub wikidata_id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub rotten_tomatoes_id: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default, alias = "box_office_gross")]
    pub box_office: Option<f64>,
    #[serde(default)]
    pub genre: Option<OneOrMany>,
    #[serde(default)]
    pub cast_member: Option<OneOrMany>,
    #[serde(default)]
    pub director: Option<OneOrMany>,
}

/// One line of the ratings table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingRecord {
    pub rotten_tomatoes_id: String,
    #[serde(default)]
    pub critic_percent: Option<f64>,
    #[serde(default)]
    pub critic_average: Option<f64>,
    #[serde(default)]
    pub audience_percent: Option<f64>,
    #[serde(default)]
    pub audience_average: Option<f64>,
}

/// One line of a reference table.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceRecord {
    pub wikidata_id: String,
    #[serde(alias = "genre_label")]
    pub label: String,
}

/// Parse one record per non-blank line.
pub fn read_json_lines<T, R>(reader: R) -> Result<Vec<T>, LoaderError>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| LoaderError::Json {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Open a file for line reading, decompressing `.gz` files on the fly.
pub fn open_lines(path: &Path) -> Result<Box<dyn BufRead>, LoaderError> {
    let file = File::open(path)?;
    let gzipped = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Build the movie table. Category fields become `List(String)` columns.
pub fn movies_frame(records: Vec<MovieRecord>) -> Result<DataFrame, LoaderError> {
    let n = records.len();
    let mut ids = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    let mut rt_ids = Vec::with_capacity(n);
    let mut dates = Vec::with_capacity(n);
    let mut costs = Vec::with_capacity(n);
    let mut grosses = Vec::with_capacity(n);
    let mut genres = Vec::with_capacity(n);
    let mut cast = Vec::with_capacity(n);
    let mut directors = Vec::with_capacity(n);

    for record in records {
        ids.push(Some(record.wikidata_id));
        labels.push(record.label);
        rt_ids.push(record.rotten_tomatoes_id);
        dates.push(record.publication_date);
        costs.push(record.cost);
        grosses.push(record.box_office);
        genres.push(record.genre.map(OneOrMany::into_vec));
        cast.push(record.cast_member.map(OneOrMany::into_vec));
        directors.push(record.director.map(OneOrMany::into_vec));
    }

    let df = DataFrame::new(vec![
        string_column(columns::WIKIDATA_ID, ids),
        string_column(columns::LABEL, labels),
        string_column(columns::ROTTEN_TOMATOES_ID, rt_ids),
        string_column(columns::PUBLICATION_DATE, dates),
        f64_column(columns::COST, costs),
        f64_column(columns::BOX_OFFICE, grosses),
        list_column(columns::GENRE, &genres),
        list_column(columns::CAST_MEMBER, &cast),
        list_column(columns::DIRECTOR, &directors),
    ])?;
    debug!(rows = df.height(), "built movie table");
    Ok(df)
}

/// Build the ratings table.
pub fn ratings_frame(records: Vec<RatingRecord>) -> Result<DataFrame, LoaderError> {
    let df = DataFrame::new(vec![
        string_column(
            columns::ROTTEN_TOMATOES_ID,
            records
                .iter()
                .map(|r| Some(r.rotten_tomatoes_id.clone()))
                .collect(),
        ),
        f64_column(
            columns::CRITIC_PERCENT,
            records.iter().map(|r| r.critic_percent).collect(),
        ),
        f64_column(
            columns::CRITIC_AVERAGE,
            records.iter().map(|r| r.critic_average).collect(),
        ),
        f64_column(
            columns::AUDIENCE_PERCENT,
            records.iter().map(|r| r.audience_percent).collect(),
        ),
        f64_column(
            columns::AUDIENCE_AVERAGE,
            records.iter().map(|r| r.audience_average).collect(),
        ),
    ])?;
    debug!(rows = df.height(), "built ratings table");
    Ok(df)
}

/// Build a reference table, keeping the first label of a duplicated id.
pub fn reference_table(records: Vec<ReferenceRecord>) -> ReferenceTable {
    let total = records.len();
    let table: ReferenceTable = records
        .into_iter()
        .map(|r| (r.wikidata_id, r.label))
        .collect();
    if table.len() < total {
        warn!(
            duplicates = total - table.len(),
            "reference table contains duplicate identifiers; keeping first label"
        );
    }
    table
}

pub fn load_movies(path: &Path) -> Result<DataFrame, LoaderError> {
    movies_frame(read_json_lines(open_lines(path)?)?)
}

pub fn load_ratings(path: &Path) -> Result<DataFrame, LoaderError> {
    ratings_frame(read_json_lines(open_lines(path)?)?)
}

pub fn load_reference(path: &Path) -> Result<ReferenceTable, LoaderError> {
    Ok(reference_table(read_json_lines(open_lines(path)?)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::{f64_values, list_values, string_values};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    const MOVIES: &str = r#"
{"wikidata_id": "Q1", "label": "Heat", "genre": ["Q10", "Q11"], "cast_member": "Q20", "cost": 60.0, "box_office": 187.4}
{"wikidata_id": "Q2", "label": "Ronin", "rotten_tomatoes_id": "m/ronin", "publication_date": "1998-09-25", "director": null}
"#;

    #[test]
    fn reads_single_and_list_category_fields() {
        let records: Vec<MovieRecord> = read_json_lines(Cursor::new(MOVIES)).unwrap();
        let df = movies_frame(records).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            list_values(&df, columns::GENRE).unwrap()[0],
            Some(vec!["Q10".to_string(), "Q11".to_string()])
        );
        assert_eq!(
            list_values(&df, columns::CAST_MEMBER).unwrap()[0],
            Some(vec!["Q20".to_string()])
        );
        assert_eq!(list_values(&df, columns::DIRECTOR).unwrap()[1], None);
        assert_eq!(
            f64_values(&df, columns::COST).unwrap(),
            vec![Some(60.0), None]
        );
        assert_eq!(
            string_values(&df, columns::ROTTEN_TOMATOES_ID).unwrap()[1].as_deref(),
            Some("m/ronin")
        );
    }

    #[test]
    fn reports_line_number_of_malformed_record() {
        let input = "{\"rotten_tomatoes_id\": \"m/a\"}\n{not json}\n";
        let err = read_json_lines::<RatingRecord, _>(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, LoaderError::Json { line: 2, .. }));
    }

    #[test]
    fn reference_records_accept_genre_label() {
        let input = r#"{"wikidata_id": "Q10", "genre_label": "drama film"}
{"wikidata_id": "Q10", "genre_label": "duplicate"}
{"wikidata_id": "Q11", "label": "crime film"}"#;
        let table = reference_table(read_json_lines(Cursor::new(input)).unwrap());
        assert_eq!(table.len(), 2);
        assert_eq!(table.label("Q10"), Some("drama film"));
        assert_eq!(table.label("Q11"), Some("crime film"));
    }

    #[test]
    fn loads_gzipped_ratings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotten-tomatoes.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        writeln!(
            encoder,
            r#"{{"rotten_tomatoes_id": "m/heat", "critic_percent": 87, "audience_average": 4.3}}"#
        )
        .unwrap();
        encoder.finish().unwrap();

        let df = load_ratings(&path).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(
            f64_values(&df, columns::CRITIC_PERCENT).unwrap(),
            vec![Some(87.0)]
        );
        assert_eq!(f64_values(&df, columns::CRITIC_AVERAGE).unwrap(), vec![None]);
    }
}
