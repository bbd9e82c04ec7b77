//! Trending searches: a counter per search term, ranked by count

use crate::{
    error::{AppError, AppResult},
    models::{Movie, SearchMetric},
};

mod memory;
mod postgres;
mod redis;

pub use memory::InMemoryMetricStore;
pub use postgres::PostgresMetricStore;
pub use self::redis::RedisMetricStore;

/// Number of trending terms returned when the caller does not ask for a count
pub const DEFAULT_TRENDING_LIMIT: usize = 5;

#[async_trait::async_trait]
pub trait MetricStore: Send + Sync {
    /// Counts one search of `term`, capturing `sample` on the first one
    async fn record_search(&self, term: &str, sample: &Movie) -> AppResult<SearchMetric>;

    /// The `n` most searched terms, count descending, term ascending on ties
    async fn top_n(&self, n: usize) -> AppResult<Vec<SearchMetric>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Trims a search term, rejecting empty ones
pub(crate) fn normalize_term(term: &str) -> AppResult<&str> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AppError::InvalidInput(
            "Search term cannot be empty".to_string(),
        ));
    }
    Ok(term)
}
