use sqlx::PgPool;

use super::{normalize_term, MetricStore};
use crate::{
    error::AppResult,
    models::{Movie, SearchMetric},
};

#[derive(sqlx::FromRow)]
struct MetricRow {
    search_term: String,
    count: i64,
    movie_id: i64,
    poster_url: Option<String>,
}

impl From<MetricRow> for SearchMetric {
    fn from(row: MetricRow) -> Self {
        Self {
            search_term: row.search_term,
            count: row.count,
            movie_id: row.movie_id,
            poster_url: row.poster_url,
        }
    }
}

/// Search metrics in the `search_metrics` table
///
/// The upsert increments atomically, so concurrent searches never lose counts.
#[derive(Clone)]
pub struct PostgresMetricStore {
    pool: PgPool,
}

impl PostgresMetricStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MetricStore for PostgresMetricStore {
    async fn record_search(&self, term: &str, sample: &Movie) -> AppResult<SearchMetric> {
        let term = normalize_term(term)?;

        let row = sqlx::query_as::<_, MetricRow>(
            r#"
            INSERT INTO search_metrics (search_term, count, movie_id, poster_url)
            VALUES ($1, 1, $2, $3)
            ON CONFLICT (search_term) DO UPDATE SET count = search_metrics.count + 1
            RETURNING search_term, count, movie_id, poster_url
            "#,
        )
        .bind(term)
        .bind(sample.id)
        .bind(sample.poster_url())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(term = %term, count = row.count, "Recorded search");
        Ok(row.into())
    }

    async fn top_n(&self, n: usize) -> AppResult<Vec<SearchMetric>> {
        let rows = sqlx::query_as::<_, MetricRow>(
            r#"
            SELECT search_term, count, movie_id, poster_url
            FROM search_metrics
            ORDER BY count DESC, search_term COLLATE "C" ASC
            LIMIT $1
            "#,
        )
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SearchMetric::from).collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64) -> Movie {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Movie {}", id),
            "poster_path": format!("/{}.jpg", id)
        }))
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_upsert_counts_and_keeps_first_sample(pool: PgPool) {
        let store = PostgresMetricStore::new(pool);
        store.record_search("dune", &movie(1)).await.unwrap();
        let metric = store.record_search(" dune ", &movie(2)).await.unwrap();

        assert_eq!(metric.count, 2);
        assert_eq!(metric.movie_id, 1);
        assert_eq!(
            metric.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/1.jpg")
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_ties_use_byte_order_like_memory_store(pool: PgPool) {
        let store = PostgresMetricStore::new(pool);
        for term in ["a", "B", "c"] {
            store.record_search(term, &movie(1)).await.unwrap();
        }
        store.record_search("c", &movie(1)).await.unwrap();

        let terms: Vec<String> = store
            .top_n(3)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.search_term)
            .collect();
        assert_eq!(terms, vec!["c", "B", "a"]);
    }
}
