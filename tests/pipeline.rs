use std::io::Cursor;

use movie_influence::data::columns;
use movie_influence::data::frame::{f64_values, string_values};
use movie_influence::data::loader::{movies_frame, ratings_frame, read_json_lines, reference_table};
use movie_influence::pipeline::ReferenceTable;
use movie_influence::{
    Category, ConfigError, Pipeline, PipelineConfig, PipelineError, PipelineInputs, RatingKind,
    YearRange,
};

const MOVIES: &str = r#"
{"wikidata_id": "Q100", "label": "First", "rotten_tomatoes_id": "m/first", "publication_date": "1991-03-01", "cost": 10.0, "box_office": 20.0, "genre": ["Q1"], "cast_member": ["A", "B"], "director": "D1"}
{"wikidata_id": "Q101", "label": "Second", "rotten_tomatoes_id": "m/second", "publication_date": "1995-06-01", "cost": 10.0, "box_office": 40.0, "genre": ["Q1", "Q2"], "cast_member": ["A"], "director": "D1"}
{"wikidata_id": "Q102", "label": "Third", "rotten_tomatoes_id": "m/third", "publication_date": "2004-01-01", "cost": 10.0, "box_office": 60.0, "genre": ["Q1"], "cast_member": ["C"], "director": "D2"}
{"wikidata_id": "Q103", "label": "Unrated", "rotten_tomatoes_id": "m/unrated", "publication_date": "1999", "cost": 10.0, "box_office": 1000000.0, "genre": ["Q2"], "cast_member": ["B"], "director": "D2"}
{"wikidata_id": "Q104", "label": "No Budget", "publication_date": "not a date", "genre": ["Q3"], "cast_member": ["A"]}
"#;

const RATINGS: &str = r#"
{"rotten_tomatoes_id": "m/first", "critic_percent": 50, "critic_average": 5.5, "audience_percent": 60, "audience_average": 3.1}
{"rotten_tomatoes_id": "m/second", "critic_percent": 90, "critic_average": 8.0, "audience_percent": 80, "audience_average": 4.0}
{"rotten_tomatoes_id": "m/third", "critic_percent": 70, "critic_average": 6.1, "audience_percent": null, "audience_average": 3.5}
"#;

const GENRES: &str = r#"
{"wikidata_id": "Q1", "genre_label": "drama film"}
{"wikidata_id": "Q2", "genre_label": "comedy film"}
"#;

fn inputs() -> PipelineInputs {
    let movies = movies_frame(read_json_lines(Cursor::new(MOVIES)).unwrap()).unwrap();
    let ratings = ratings_frame(read_json_lines(Cursor::new(RATINGS)).unwrap()).unwrap();
    let genres = reference_table(read_json_lines(Cursor::new(GENRES)).unwrap());
    let cast: ReferenceTable = [("A", "Actor A"), ("B", "Actor B"), ("C", "Actor C")]
        .into_iter()
        .collect();

    PipelineInputs::new(movies, ratings)
        .with_reference(Category::Genre, genres)
        .with_reference(Category::CastMember, cast)
}

fn strings(values: Vec<Option<String>>) -> Vec<String> {
    values.into_iter().flatten().collect()
}

#[test]
fn drama_returns_average_over_three_movies() {
    let inputs = inputs();
    let config = PipelineConfig::new(Category::Genre, RatingKind::Return).with_thresholds(3, 1);

    let output = Pipeline::new(&inputs).run(&config).unwrap();

    assert_eq!(output.influencers.len(), 1);
    let drama = &output.influencers.ranked()[0];
    assert_eq!(drama.value, "Q1");
    assert_eq!(drama.mean, 4.0);
    assert_eq!(drama.count, 3);

    let genres = strings(string_values(&output.table, columns::GENRE).unwrap());
    assert_eq!(genres, vec!["drama film"; 3]);
    // rows arrive ordered by return, highest first
    assert_eq!(
        f64_values(&output.table, columns::RETURN).unwrap(),
        vec![Some(6.0), Some(4.0), Some(2.0)]
    );
}

#[test]
fn out_of_range_return_is_excluded() {
    let inputs = inputs();
    let config = PipelineConfig::new(Category::Genre, RatingKind::Return).with_thresholds(1, 10);

    let output = Pipeline::new(&inputs).run(&config).unwrap();

    // Q103 returns 100000x and has no other genre member; Q104 has no budget
    let labels = strings(string_values(&output.table, columns::LABEL).unwrap());
    assert!(!labels.contains(&"Unrated".to_string()));
    assert!(!labels.contains(&"No Budget".to_string()));

    let comedy = output
        .statistics
        .iter()
        .find(|s| s.value == "Q2")
        .unwrap();
    assert_eq!((comedy.mean, comedy.count), (4.0, 1));
}

#[test]
fn only_influential_cast_member_rows_survive() {
    let inputs = inputs();
    let config =
        PipelineConfig::new(Category::CastMember, RatingKind::Return).with_thresholds(1, 1);

    let output = Pipeline::new(&inputs).run(&config).unwrap();

    // C (6.0) ranks first; A averages 3.0 and B 2.0
    assert_eq!(output.influencers.values().collect::<Vec<_>>(), vec!["C"]);
    assert_eq!(
        strings(string_values(&output.table, columns::CAST_MEMBER).unwrap()),
        vec!["Actor C"]
    );
    assert_eq!(
        f64_values(&output.table, columns::RETURN).unwrap(),
        vec![Some(6.0)]
    );
}

#[test]
fn multi_cast_movie_keeps_only_influential_member() {
    let inputs = inputs();
    let config = PipelineConfig::new(Category::CastMember, RatingKind::Return)
        .with_thresholds(1, 2)
        .with_year_range(Some(YearRange::new(1990, 1992)));

    let output = Pipeline::new(&inputs).run(&config).unwrap();

    // only "First" (cast A, B; return 2.0) is published in 1990..1992
    assert_eq!(output.table.height(), 2);
    assert_eq!(
        strings(string_values(&output.table, columns::CAST_MEMBER).unwrap()),
        vec!["Actor A", "Actor B"]
    );

    let config = config.with_thresholds(1, 1);
    let output = Pipeline::new(&inputs).run(&config).unwrap();
    // A and B tie at 2.0, the identifier breaks the tie
    assert_eq!(
        strings(string_values(&output.table, columns::CAST_MEMBER).unwrap()),
        vec!["Actor A"]
    );
    assert_eq!(
        f64_values(&output.table, columns::RETURN).unwrap(),
        vec![Some(2.0)]
    );
}

#[test]
fn unrated_movies_never_reach_the_output() {
    let inputs = inputs();
    let config =
        PipelineConfig::new(Category::Genre, RatingKind::CriticPercent).with_thresholds(1, 10);

    let output = Pipeline::new(&inputs).run(&config).unwrap();

    // m/unrated has no ratings row, m/third lacks audience_percent
    let labels = strings(string_values(&output.table, columns::LABEL).unwrap());
    assert_eq!(labels, vec!["First", "Second", "Second"]);
    assert_eq!(
        f64_values(&output.table, columns::CRITIC_PERCENT).unwrap(),
        vec![Some(50.0), Some(90.0), Some(90.0)]
    );
    assert_eq!(
        output.table.get_column_names().len(),
        4,
        "output is trimmed to label, date, category and rating"
    );
}

#[test]
fn relaxed_required_columns_keep_partial_ratings() {
    let inputs = inputs();
    let mut config =
        PipelineConfig::new(Category::Genre, RatingKind::CriticPercent).with_thresholds(1, 10);
    config.required_score_columns = vec![columns::CRITIC_PERCENT.to_string()];

    let output = Pipeline::new(&inputs).run(&config).unwrap();
    let labels = strings(string_values(&output.table, columns::LABEL).unwrap());
    assert!(labels.contains(&"Third".to_string()));
}

#[test]
fn missing_reference_keeps_identifiers() {
    let inputs = inputs();
    let config = PipelineConfig::new(Category::Director, RatingKind::Return).with_thresholds(1, 5);

    let output = Pipeline::new(&inputs).run(&config).unwrap();
    let directors = strings(string_values(&output.table, columns::DIRECTOR).unwrap());
    assert!(directors.iter().all(|d| d == "D1" || d == "D2"));
}

#[test]
fn empty_influencer_set_is_not_an_error() {
    let inputs = inputs();
    let config = PipelineConfig::new(Category::Genre, RatingKind::Return).with_thresholds(40, 25);

    let output = Pipeline::new(&inputs).run(&config).unwrap();
    assert!(output.influencers.is_empty());
    assert_eq!(output.table.height(), 0);
    assert_eq!(output.group_count(&config).unwrap(), 0);
}

#[test]
fn malformed_configuration_fails_fast() {
    let inputs = inputs();
    let config = PipelineConfig::new(Category::Genre, RatingKind::Return).with_thresholds(0, 25);

    let err = Pipeline::new(&inputs).run(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::ZeroMinMovies)
    ));
}

#[test]
fn missing_join_key_column_is_reported() {
    let mut inputs = inputs();
    inputs.movies = inputs.movies.drop(columns::ROTTEN_TOMATOES_ID).unwrap();
    let config = PipelineConfig::new(Category::Genre, RatingKind::AudienceAverage);

    let err = Pipeline::new(&inputs).run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn { table: "movie", .. }));
}

#[test]
fn repeated_runs_are_identical() {
    let inputs = inputs();
    let config = PipelineConfig::new(Category::Genre, RatingKind::Return).with_thresholds(1, 10);
    let pipeline = Pipeline::new(&inputs);

    let first = pipeline.run(&config).unwrap();
    let second = pipeline.run(&config).unwrap();
    assert_eq!(first.statistics, second.statistics);
    assert!(first.table.equals_missing(&second.table));
}

#[test]
fn categories_run_in_parallel_keep_request_order() {
    let inputs = inputs();
    let base = PipelineConfig::new(Category::Genre, RatingKind::Return).with_thresholds(1, 10);

    let results = Pipeline::new(&inputs).run_categories(&base, &Category::ALL);
    let order: Vec<Category> = results.iter().map(|(c, _)| *c).collect();
    assert_eq!(order, Category::ALL.to_vec());
    assert!(results.iter().all(|(_, r)| r.is_ok()));
}
