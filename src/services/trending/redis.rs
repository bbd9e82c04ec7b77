use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{Deserialize, Serialize};

use super::{normalize_term, MetricStore};
use crate::{
    error::AppResult,
    models::{rank_metrics, Movie, SearchMetric},
};

const COUNTS_KEY: &str = "search_metrics:counts";
const SAMPLES_KEY: &str = "search_metrics:samples";

/// Sample movie stored per term in the samples hash
#[derive(Debug, Serialize, Deserialize)]
struct StoredSample {
    movie_id: i64,
    poster_url: Option<String>,
}

/// Search metrics in Redis
///
/// Counts live in a sorted set bumped with `ZINCRBY`; the first search's
/// sample is written once with `HSETNX`. Both happen in one `MULTI`, so
/// concurrent searches from any number of processes never lose counts.
#[derive(Clone)]
pub struct RedisMetricStore {
    conn: ConnectionManager,
    counts_key: String,
    samples_key: String,
}

impl RedisMetricStore {
    pub async fn connect(client: Client) -> AppResult<Self> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            counts_key: COUNTS_KEY.to_string(),
            samples_key: SAMPLES_KEY.to_string(),
        })
    }

    /// Keeps metrics under a key prefix other than `search_metrics`
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.counts_key = format!("{}:counts", prefix);
        self.samples_key = format!("{}:samples", prefix);
        self
    }

    fn metric(term: String, score: f64, sample: Option<String>) -> AppResult<SearchMetric> {
        let sample = match sample {
            Some(json) => serde_json::from_str::<StoredSample>(&json)?,
            None => {
                tracing::warn!(term = %term, "Trending term has no stored sample");
                StoredSample {
                    movie_id: 0,
                    poster_url: None,
                }
            }
        };

        Ok(SearchMetric {
            search_term: term,
            count: score as i64,
            movie_id: sample.movie_id,
            poster_url: sample.poster_url,
        })
    }
}

#[async_trait::async_trait]
impl MetricStore for RedisMetricStore {
    async fn record_search(&self, term: &str, sample: &Movie) -> AppResult<SearchMetric> {
        let term = normalize_term(term)?;
        let stored = serde_json::to_string(&StoredSample {
            movie_id: sample.id,
            poster_url: sample.poster_url(),
        })?;

        let mut conn = self.conn.clone();
        let (score, first_sample): (f64, Option<String>) = redis::pipe()
            .atomic()
            .hset_nx(&self.samples_key, term, stored)
            .ignore()
            .zincr(&self.counts_key, term, 1)
            .hget(&self.samples_key, term)
            .query_async(&mut conn)
            .await?;

        let metric = Self::metric(term.to_string(), score, first_sample)?;
        tracing::debug!(term = %term, count = metric.count, "Recorded search");
        Ok(metric)
    }

    async fn top_n(&self, n: usize) -> AppResult<Vec<SearchMetric>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let mut scored: Vec<(String, f64)> = conn
            .zrevrange_withscores(&self.counts_key, 0, n as isize - 1)
            .await?;

        // Terms tied with the nth count may sort before it by name
        if scored.len() == n {
            let threshold = scored[n - 1].1;
            scored = conn
                .zrangebyscore_withscores(&self.counts_key, threshold, "+inf")
                .await?;
        }

        if scored.is_empty() {
            return Ok(Vec::new());
        }

        let terms: Vec<&str> = scored.iter().map(|(term, _)| term.as_str()).collect();
        let samples: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(&self.samples_key)
            .arg(&terms)
            .query_async(&mut conn)
            .await?;

        let mut metrics = scored
            .into_iter()
            .zip(samples)
            .map(|((term, score), sample)| Self::metric(term, score, sample))
            .collect::<AppResult<Vec<_>>>()?;

        rank_metrics(&mut metrics);
        metrics.truncate(n);
        Ok(metrics)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn movie(id: i64) -> Movie {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Movie {}", id),
            "poster_path": format!("/{}.jpg", id)
        }))
        .unwrap()
    }

    async fn store() -> RedisMetricStore {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = Client::open(url).unwrap();
        RedisMetricStore::connect(client)
            .await
            .unwrap()
            .with_prefix(&format!("test_search_metrics:{}", Uuid::new_v4()))
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at REDIS_URL"]
    async fn test_counts_accumulate_and_first_sample_is_kept() {
        let store = store().await;
        store.record_search("dune", &movie(1)).await.unwrap();
        store.record_search(" dune", &movie(2)).await.unwrap();
        let metric = store.record_search("dune", &movie(3)).await.unwrap();

        assert_eq!(metric.count, 3);
        assert_eq!(metric.movie_id, 1);
        assert_eq!(
            metric.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/1.jpg")
        );
    }

    #[tokio::test]
    #[ignore = "requires a Redis server at REDIS_URL"]
    async fn test_top_n_breaks_ties_by_term() {
        let store = store().await;
        for _ in 0..3 {
            store.record_search("matrix", &movie(1)).await.unwrap();
        }
        store.record_search("zodiac", &movie(2)).await.unwrap();
        store.record_search("alien", &movie(3)).await.unwrap();
        store.record_search("jaws", &movie(4)).await.unwrap();

        let terms: Vec<String> = store
            .top_n(2)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.search_term)
            .collect();
        assert_eq!(terms, vec!["matrix", "alien"]);
        assert!(store.top_n(0).await.unwrap().is_empty());
    }
}
