use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{already_exists, not_in_watchlist, WatchlistStore};
use crate::{
    error::AppResult,
    models::{Movie, WatchlistEntry},
};

#[derive(sqlx::FromRow)]
struct WatchlistRow {
    movie_id: i64,
    title: String,
    poster_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f64>,
    overview: Option<String>,
    added_at: DateTime<Utc>,
}

impl From<WatchlistRow> for WatchlistEntry {
    fn from(row: WatchlistRow) -> Self {
        Self {
            movie_id: row.movie_id,
            title: row.title,
            poster_path: row.poster_path,
            release_date: row.release_date,
            vote_average: row.vote_average,
            overview: row.overview,
            added_at: row.added_at,
        }
    }
}

/// Watchlists stored in the `watchlist_entries` table
///
/// The `(user_id, movie_id)` primary key enforces one entry per movie even
/// with concurrent writers.
#[derive(Clone)]
pub struct PostgresWatchlistStore {
    pool: PgPool,
}

impl PostgresWatchlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WatchlistStore for PostgresWatchlistStore {
    async fn add(&self, user_id: Uuid, movie: &Movie) -> AppResult<WatchlistEntry> {
        let entry = WatchlistEntry::from_movie(movie, Utc::now());

        let row = sqlx::query_as::<_, WatchlistRow>(
            r#"
            INSERT INTO watchlist_entries
                (user_id, movie_id, title, poster_path, release_date, vote_average, overview, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, movie_id) DO NOTHING
            RETURNING movie_id, title, poster_path, release_date, vote_average, overview, added_at
            "#,
        )
        .bind(user_id)
        .bind(entry.movie_id)
        .bind(&entry.title)
        .bind(&entry.poster_path)
        .bind(&entry.release_date)
        .bind(entry.vote_average)
        .bind(&entry.overview)
        .bind(entry.added_at)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(already_exists(&movie.title));
        };

        tracing::info!(user_id = %user_id, movie_id = movie.id, backend = "postgres", "Added movie to watchlist");
        Ok(row.into())
    }

    async fn remove(&self, user_id: Uuid, movie_id: i64) -> AppResult<WatchlistEntry> {
        let row = sqlx::query_as::<_, WatchlistRow>(
            r#"
            DELETE FROM watchlist_entries
            WHERE user_id = $1 AND movie_id = $2
            RETURNING movie_id, title, poster_path, release_date, vote_average, overview, added_at
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| not_in_watchlist(movie_id))?;

        tracing::info!(user_id = %user_id, movie_id, backend = "postgres", "Removed movie from watchlist");
        Ok(row.into())
    }

    async fn list(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let rows = sqlx::query_as::<_, WatchlistRow>(
            r#"
            SELECT movie_id, title, poster_path, release_date, vote_average, overview, added_at
            FROM watchlist_entries
            WHERE user_id = $1
            ORDER BY added_at ASC, movie_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WatchlistEntry::from).collect())
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<usize> {
        let result = sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() as usize;
        if removed > 0 {
            tracing::info!(user_id = %user_id, removed, "Cleared watchlist");
        }

        Ok(removed)
    }

    async fn is_member(&self, user_id: Uuid, movie_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM watchlist_entries WHERE user_id = $1 AND movie_id = $2)",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
