//! Influencer Selector
//! Minimum-support filter followed by top-K ranking on mean rating.

use std::collections::HashSet;

use super::aggregator::{rank_order, CategoryStat};

/// Top category values for one (category, rating) pair, best first.
///
/// Sets built from bare values carry no statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfluencerSet {
    members: Vec<String>,
    lookup: HashSet<String>,
    stats: Vec<CategoryStat>,
}

impl InfluencerSet {
    pub fn from_ranked(ranked: Vec<CategoryStat>) -> Self {
        let members: Vec<String> = ranked.iter().map(|s| s.value.clone()).collect();
        Self {
            lookup: members.iter().cloned().collect(),
            members,
            stats: ranked,
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.lookup.contains(value)
    }

    /// Statistics of the selected values; empty for a bare value set.
    pub fn ranked(&self) -> &[CategoryStat] {
        &self.stats
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for InfluencerSet {
    /// Build a set of bare values, e.g. to re-filter with a known selection.
    /// Repeated values are kept once, in first-seen order.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = InfluencerSet::default();
        for value in iter {
            let value = value.into();
            if set.lookup.insert(value.clone()) {
                set.members.push(value);
            }
        }
        set
    }
}

/// Keep values with at least `min_movies` movies and return the best `top_k`
/// by mean rating. Fewer survivors than `top_k` is not an error.
pub fn select(stats: &[CategoryStat], min_movies: usize, top_k: usize) -> InfluencerSet {
    let mut supported: Vec<CategoryStat> = stats
        .iter()
        .filter(|s| s.count >= min_movies)
        .cloned()
        .collect();
    supported.sort_by(rank_order);
    supported.truncate(top_k);
    InfluencerSet::from_ranked(supported)
}
