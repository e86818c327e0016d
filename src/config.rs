//! Pipeline Configuration Module
//! Category / rating selection, thresholds and the derived cache key.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::data::columns;

/// Default minimum number of movies a category value needs to be considered.
pub const DEFAULT_MIN_MOVIES: usize = 40;

/// Default number of influencers kept per category.
pub const DEFAULT_TOP_K: usize = 25;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown category '{0}' (expected genre, cast_member or director)")]
    UnknownCategory(String),
    #[error(
        "Unknown rating '{0}' (expected return, critic_percent, critic_average, audience_percent or audience_average)"
    )]
    UnknownRating(String),
    #[error("min_movies must be a positive integer")]
    ZeroMinMovies,
    #[error("top_k must be a positive integer")]
    ZeroTopK,
    #[error("Year range start {start} must be before end {end}")]
    EmptyYearRange { start: i32, end: i32 },
    #[error("Ratio bounds [{min}, {max}] are invalid")]
    InvalidRatioBounds { min: f64, max: f64 },
}

/// Classificatory dimension of a movie.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Category {
    Genre,
    CastMember,
    Director,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Genre, Category::CastMember, Category::Director];

    /// Column holding this category in the movie table.
    pub fn column(&self) -> &'static str {
        match self {
            Category::Genre => columns::GENRE,
            Category::CastMember => columns::CAST_MEMBER,
            Category::Director => columns::DIRECTOR,
        }
    }

    /// Human readable plural, e.g. "Cast Members".
    pub fn title(&self) -> &'static str {
        match self {
            Category::Genre => "Genres",
            Category::CastMember => "Cast Members",
            Category::Director => "Directors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.column() == s)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

/// Numeric rating a comparison is made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum RatingKind {
    /// Box office gross divided by cost.
    Return,
    CriticPercent,
    CriticAverage,
    AudiencePercent,
    AudienceAverage,
}

impl RatingKind {
    pub const ALL: [RatingKind; 5] = [
        RatingKind::Return,
        RatingKind::CriticPercent,
        RatingKind::CriticAverage,
        RatingKind::AudiencePercent,
        RatingKind::AudienceAverage,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            RatingKind::Return => columns::RETURN,
            RatingKind::CriticPercent => columns::CRITIC_PERCENT,
            RatingKind::CriticAverage => columns::CRITIC_AVERAGE,
            RatingKind::AudiencePercent => columns::AUDIENCE_PERCENT,
            RatingKind::AudienceAverage => columns::AUDIENCE_AVERAGE,
        }
    }

    /// Ratio ratings are derived from the movie table and bounded; score
    /// ratings come from the external ratings table.
    pub fn is_ratio(&self) -> bool {
        matches!(self, RatingKind::Return)
    }

    /// Axis label used when reporting this rating.
    pub fn axis_label(&self) -> String {
        match self {
            RatingKind::Return => "Percent Return (box office/cost)".to_string(),
            other => format!("Rotten Tomatoes' {}", title_case(other.column())),
        }
    }
}

impl fmt::Display for RatingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for RatingKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingKind::ALL
            .into_iter()
            .find(|r| r.column() == s)
            .ok_or_else(|| ConfigError::UnknownRating(s.to_string()))
    }
}

/// Publication year window, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year < self.end
    }
}

/// Accepted range for ratio ratings, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBounds {
    pub min: f64,
    pub max: f64,
}

impl RatioBounds {
    pub const DEFAULT: RatioBounds = RatioBounds {
        min: 0.0001,
        max: 3000.0,
    };

    /// Upper clamp used by earlier comparison runs.
    pub const LEGACY: RatioBounds = RatioBounds {
        min: 0.0001,
        max: 5000.0,
    };

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for RatioBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything one pipeline run depends on besides its input tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub category: Category,
    pub rating: RatingKind,
    pub min_movies: usize,
    pub top_k: usize,
    pub year_range: Option<YearRange>,
    pub ratio_bounds: RatioBounds,
    /// Score columns that must all be present for a rating row to be kept.
    pub required_score_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            category: Category::Genre,
            rating: RatingKind::Return,
            min_movies: DEFAULT_MIN_MOVIES,
            top_k: DEFAULT_TOP_K,
            year_range: None,
            ratio_bounds: RatioBounds::DEFAULT,
            required_score_columns: columns::SCORE_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn new(category: Category, rating: RatingKind) -> Self {
        Self {
            category,
            rating,
            ..Default::default()
        }
    }

    pub fn with_thresholds(mut self, min_movies: usize, top_k: usize) -> Self {
        self.min_movies = min_movies;
        self.top_k = top_k;
        self
    }

    pub fn with_year_range(mut self, year_range: Option<YearRange>) -> Self {
        self.year_range = year_range;
        self
    }

    pub fn with_ratio_bounds(mut self, bounds: RatioBounds) -> Self {
        self.ratio_bounds = bounds;
        self
    }

    /// Reject configurations that can never produce a meaningful table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_movies == 0 {
            return Err(ConfigError::ZeroMinMovies);
        }
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        if let Some(range) = self.year_range {
            if range.start >= range.end {
                return Err(ConfigError::EmptyYearRange {
                    start: range.start,
                    end: range.end,
                });
            }
        }
        let bounds = self.ratio_bounds;
        if !(bounds.min.is_finite() && bounds.max.is_finite() && bounds.min <= bounds.max) {
            return Err(ConfigError::InvalidRatioBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        Ok(())
    }

    /// Deterministic key for persisting the output of this configuration,
    /// e.g. `genre-return-40-25` or `director-critic_percent-5-50-1990-2000`.
    ///
    /// Non-default ratio bounds append `-r{min}-{max}` and a non-default
    /// required score set appends `-q{col+col}` (sorted, deduplicated).
    pub fn cache_key(&self) -> String {
        let mut key = format!(
            "{}-{}-{}-{}",
            self.category, self.rating, self.min_movies, self.top_k
        );
        if let Some(range) = self.year_range {
            key.push_str(&format!("-{}-{}", range.start, range.end));
        }
        if self.ratio_bounds != RatioBounds::DEFAULT {
            key.push_str(&format!(
                "-r{}-{}",
                self.ratio_bounds.min, self.ratio_bounds.max
            ));
        }
        let required = normalized_columns(&self.required_score_columns);
        if required != normalized_columns(&Self::default().required_score_columns) {
            key.push_str(&format!("-q{}", required.join("+")));
        }
        key
    }
}

fn normalized_columns(columns: &[String]) -> Vec<&str> {
    let mut names: Vec<&str> = columns.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.dedup();
    names
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
