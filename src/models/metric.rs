use serde::{Deserialize, Serialize};

use super::Movie;

/// Aggregate search count for one search term
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchMetric {
    pub search_term: String,
    pub count: i64,
    /// Sample movie captured on the term's first search
    pub movie_id: i64,
    pub poster_url: Option<String>,
}

impl SearchMetric {
    /// Starts a new metric at count 1
    pub fn first_search(term: &str, sample: &Movie) -> Self {
        Self {
            search_term: term.to_string(),
            count: 1,
            movie_id: sample.id,
            poster_url: sample.poster_url(),
        }
    }
}

/// Ranks metrics by count descending, search term ascending on ties
pub fn rank_metrics(metrics: &mut [SearchMetric]) {
    metrics.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.search_term.cmp(&b.search_term))
    });
}
