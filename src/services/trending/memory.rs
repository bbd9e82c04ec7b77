use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{normalize_term, MetricStore};
use crate::{
    error::AppResult,
    models::{rank_metrics, Movie, SearchMetric},
};

/// Search metrics kept in process memory
#[derive(Default)]
pub struct InMemoryMetricStore {
    metrics: RwLock<HashMap<String, SearchMetric>>,
}

impl InMemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn record_search(&self, term: &str, sample: &Movie) -> AppResult<SearchMetric> {
        let term = normalize_term(term)?;
        let mut metrics = self.metrics.write().await;

        let metric = metrics
            .entry(term.to_string())
            .and_modify(|m| m.count += 1)
            .or_insert_with(|| SearchMetric::first_search(term, sample));

        tracing::debug!(term = %term, count = metric.count, "Recorded search");
        Ok(metric.clone())
    }

    async fn top_n(&self, n: usize) -> AppResult<Vec<SearchMetric>> {
        let mut ranked: Vec<SearchMetric> = self.metrics.read().await.values().cloned().collect();
        rank_metrics(&mut ranked);
        ranked.truncate(n);
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn movie(id: i64) -> Movie {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Movie {}", id),
            "poster_path": format!("/{}.jpg", id)
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_three_searches_count_three() {
        let store = InMemoryMetricStore::new();
        for _ in 0..3 {
            store.record_search("dune", &movie(438631)).await.unwrap();
        }

        let top = store.top_n(5).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].search_term, "dune");
        assert_eq!(top[0].count, 3);
    }

    #[tokio::test]
    async fn test_first_sample_is_kept() {
        let store = InMemoryMetricStore::new();
        store.record_search("dune", &movie(1)).await.unwrap();
        let metric = store.record_search("dune", &movie(2)).await.unwrap();

        assert_eq!(metric.movie_id, 1);
        assert_eq!(
            metric.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/1.jpg")
        );
    }

    #[tokio::test]
    async fn test_top_one_returns_highest_count() {
        let store = InMemoryMetricStore::new();
        for _ in 0..5 {
            store.record_search("a", &movie(1)).await.unwrap();
        }
        for _ in 0..2 {
            store.record_search("b", &movie(2)).await.unwrap();
        }

        let top = store.top_n(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].search_term, "a");
    }

    #[tokio::test]
    async fn test_ties_break_by_term() {
        let store = InMemoryMetricStore::new();
        store.record_search("matrix", &movie(1)).await.unwrap();
        store.record_search("alien", &movie(2)).await.unwrap();
        store.record_search("jaws", &movie(3)).await.unwrap();

        let terms: Vec<String> = store
            .top_n(5)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.search_term)
            .collect();
        assert_eq!(terms, vec!["alien", "jaws", "matrix"]);
    }

    #[tokio::test]
    async fn test_term_is_trimmed_and_empty_rejected() {
        let store = InMemoryMetricStore::new();
        store.record_search("  dune ", &movie(1)).await.unwrap();
        store.record_search("dune", &movie(1)).await.unwrap();

        assert_eq!(store.top_n(5).await.unwrap()[0].count, 2);
        assert!(matches!(
            store.record_search("   ", &movie(1)).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
