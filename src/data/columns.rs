//! Column names shared by the movie, rating and output tables.

pub const WIKIDATA_ID: &str = "wikidata_id";
pub const LABEL: &str = "label";
pub const ROTTEN_TOMATOES_ID: &str = "rotten_tomatoes_id";
pub const PUBLICATION_DATE: &str = "publication_date";
pub const COST: &str = "cost";
pub const BOX_OFFICE: &str = "box_office";

pub const GENRE: &str = "genre";
pub const CAST_MEMBER: &str = "cast_member";
pub const DIRECTOR: &str = "director";

pub const RETURN: &str = "return";
pub const CRITIC_PERCENT: &str = "critic_percent";
pub const CRITIC_AVERAGE: &str = "critic_average";
pub const AUDIENCE_PERCENT: &str = "audience_percent";
pub const AUDIENCE_AVERAGE: &str = "audience_average";

/// Rating columns supplied by the external ratings table.
pub const SCORE_COLUMNS: [&str; 4] = [
    CRITIC_PERCENT,
    CRITIC_AVERAGE,
    AUDIENCE_PERCENT,
    AUDIENCE_AVERAGE,
];
