//! Movie Influence - data preparation for category influence comparisons
//!
//! Joins movie metadata with a chosen rating, ranks genres, cast members or
//! directors by mean rating and produces the filtered table a statistical
//! comparison runs on.

pub mod config;
pub mod data;
pub mod pipeline;
pub mod stats;

pub use config::{Category, ConfigError, PipelineConfig, RatingKind, RatioBounds, YearRange};
pub use pipeline::{Pipeline, PipelineError, PipelineInputs, PipelineOutput};
