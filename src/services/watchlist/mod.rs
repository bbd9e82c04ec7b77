//! Per-user watchlists
//!
//! One [`WatchlistStore`] interface with two implementations picked at
//! startup: [`KeyValueWatchlistStore`] keeps each user's list as a JSON array
//! under `watchlist_<user_id>`, [`PostgresWatchlistStore`] keeps one row per
//! `(user_id, movie_id)`. Both list entries oldest first.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Movie, WatchlistEntry, WatchlistStats},
};

mod kv;
mod postgres;

pub use kv::KeyValueWatchlistStore;
pub use postgres::PostgresWatchlistStore;

#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Saves a movie; fails with `AlreadyExists` when it is already listed
    async fn add(&self, user_id: Uuid, movie: &Movie) -> AppResult<WatchlistEntry>;

    /// Removes a movie and returns the removed entry; `NotFound` when absent
    async fn remove(&self, user_id: Uuid, movie_id: i64) -> AppResult<WatchlistEntry>;

    /// All entries ordered by `added_at`, then movie id
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>>;

    /// Removes every entry and returns how many were removed (0 = already empty)
    async fn clear(&self, user_id: Uuid) -> AppResult<usize>;

    async fn is_member(&self, user_id: Uuid, movie_id: i64) -> AppResult<bool>;

    async fn stats(&self, user_id: Uuid) -> AppResult<WatchlistStats> {
        let entries = self.list(user_id).await?;
        Ok(WatchlistStats::from_entries(&entries))
    }

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

pub(crate) fn already_exists(title: &str) -> crate::error::AppError {
    crate::error::AppError::AlreadyExists(format!("\"{}\" is already in your watchlist", title))
}

pub(crate) fn not_in_watchlist(movie_id: i64) -> crate::error::AppError {
    crate::error::AppError::NotFound(format!("Movie {} not found in watchlist", movie_id))
}
