//! Movie Influence - command line driver
//!
//! Loads the movie, rating and reference tables, runs the preparation
//! pipeline for one configuration (reusing a cached table when present)
//! and prints the per-group summary the comparison is made on.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use movie_influence::data::{load_movies, load_ratings, load_reference, OutputCache};
use movie_influence::stats::summarize;
use movie_influence::{
    Category, Pipeline, PipelineConfig, PipelineInputs, RatingKind, RatioBounds, YearRange,
};

#[derive(Parser, Debug)]
#[command(about = "Prepare movie metadata for genre / cast / director comparisons")]
struct Args {
    /// Property to focus on (genre, cast_member, director)
    #[arg(short, long)]
    category: Category,

    /// Score to focus on (return, critic_percent, critic_average,
    /// audience_percent, audience_average)
    #[arg(short, long)]
    score: RatingKind,

    /// Minimum number of movies of each property
    #[arg(short, long, default_value_t = movie_influence::config::DEFAULT_MIN_MOVIES)]
    movies: usize,

    /// Number of influential people/genres
    #[arg(short, long, default_value_t = movie_influence::config::DEFAULT_TOP_K)]
    influencers: usize,

    /// Bound the publication dates by the years START (inclusive) END (exclusive)
    #[arg(short, long, num_args = 2, value_names = ["START", "END"])]
    year: Option<Vec<i32>>,

    /// Largest accepted return ratio
    #[arg(long, default_value_t = RatioBounds::DEFAULT.max)]
    max_return: f64,

    /// Movie table (line-delimited JSON, optionally gzipped)
    #[arg(long, default_value = "wikidata-movies.json.gz")]
    movies_path: PathBuf,

    /// Ratings table
    #[arg(long, default_value = "rotten-tomatoes.json.gz")]
    ratings_path: PathBuf,

    /// Reference table for the chosen category
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Directory holding cached output tables
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Ignore and overwrite any cached table
    #[arg(long)]
    no_cache: bool,
}

impl Args {
    fn config(&self) -> Result<PipelineConfig> {
        let year_range = match self.year.as_deref() {
            None => None,
            Some([start, end]) => Some(YearRange::new(*start, *end)),
            Some(other) => bail!("--year expects two values, got {}", other.len()),
        };

        let config = PipelineConfig::new(self.category, self.score)
            .with_thresholds(self.movies, self.influencers)
            .with_year_range(year_range)
            .with_ratio_bounds(RatioBounds {
                max: self.max_return,
                ..RatioBounds::DEFAULT
            });
        config.validate()?;
        Ok(config)
    }

    fn reference_path(&self) -> PathBuf {
        self.reference.clone().unwrap_or_else(|| match self.category {
            Category::Genre => PathBuf::from("genres.json.gz"),
            Category::CastMember => PathBuf::from("cast-members.json.gz"),
            Category::Director => PathBuf::from("directors.json.gz"),
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = args.config()?;
    let cache = OutputCache::new(&args.cache_dir);

    let cached = if args.no_cache {
        None
    } else {
        cache.load(&config).context("reading cached table")?
    };

    let table = match cached {
        Some(table) => {
            info!(key = %config.cache_key(), rows = table.height(), "using cached table");
            table
        }
        None => {
            let movies = load_movies(&args.movies_path)
                .with_context(|| format!("loading {}", args.movies_path.display()))?;
            let ratings = if config.rating.is_ratio() {
                Default::default()
            } else {
                load_ratings(&args.ratings_path)
                    .with_context(|| format!("loading {}", args.ratings_path.display()))?
            };
            let reference_path = args.reference_path();
            let reference = load_reference(&reference_path)
                .with_context(|| format!("loading {}", reference_path.display()))?;

            let inputs =
                PipelineInputs::new(movies, ratings).with_reference(config.category, reference);
            let output = Pipeline::new(&inputs).run(&config)?;

            let path = cache.store(&config, &output.table)?;
            info!(path = %path.display(), "cached output table");
            output.table
        }
    };

    let summaries = summarize(&table, config.category.column(), config.rating.column())?;
    if summaries.len() < 2 {
        warn!(
            groups = summaries.len(),
            "fewer than two groups remain, a comparison is not meaningful"
        );
    }

    println!(
        "{} by {} ({} rows)",
        config.category.title(),
        config.rating.axis_label(),
        table.height()
    );
    println!(
        "{:<40} {:>6} {:>10} {:>10} {:>10}",
        "group", "count", "mean", "median", "std"
    );
    for summary in &summaries {
        println!(
            "{:<40} {:>6} {:>10.3} {:>10.3} {:>10.3}",
            summary.group, summary.count, summary.mean, summary.median, summary.std
        );
    }

    Ok(())
}
