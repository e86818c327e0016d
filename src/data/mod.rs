//! Data module - Table loading, column helpers and output caching

pub mod cache;
pub mod columns;
pub mod frame;
pub mod loader;

pub use cache::{CacheError, OutputCache};
pub use loader::{load_movies, load_ratings, load_reference, LoaderError};
