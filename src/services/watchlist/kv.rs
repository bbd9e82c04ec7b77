use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{already_exists, not_in_watchlist, WatchlistStore};
use crate::{
    db::KeyValueStore,
    error::{AppError, AppResult},
    models::{sort_entries, Movie, WatchlistEntry},
};

/// Watchlists stored as one JSON array per user in a key-value store
pub struct KeyValueWatchlistStore {
    kv: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles issued by this process. Writers in
    /// other processes sharing the same Redis are not covered: last write wins.
    write_lock: Mutex<()>,
}

impl KeyValueWatchlistStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    fn key(user_id: Uuid) -> String {
        format!("watchlist_{}", user_id)
    }

    async fn load(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let Some(json) = self.kv.get(&Self::key(user_id)).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&json).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Stored watchlist is not valid JSON");
            AppError::Internal(format!("Failed to load watchlist: {}", e))
        })
    }

    async fn save(&self, user_id: Uuid, entries: &[WatchlistEntry]) -> AppResult<()> {
        let key = Self::key(user_id);
        if entries.is_empty() {
            return self.kv.delete(&key).await;
        }

        let json = serde_json::to_string(entries)?;
        self.kv.set(&key, json).await
    }
}

#[async_trait::async_trait]
impl WatchlistStore for KeyValueWatchlistStore {
    async fn add(&self, user_id: Uuid, movie: &Movie) -> AppResult<WatchlistEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load(user_id).await?;

        if entries.iter().any(|e| e.movie_id == movie.id) {
            return Err(already_exists(&movie.title));
        }

        let entry = WatchlistEntry::from_movie(movie, Utc::now());
        entries.push(entry.clone());
        self.save(user_id, &entries).await?;

        tracing::info!(
            user_id = %user_id,
            movie_id = movie.id,
            backend = self.kv.name(),
            "Added movie to watchlist"
        );

        Ok(entry)
    }

    async fn remove(&self, user_id: Uuid, movie_id: i64) -> AppResult<WatchlistEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load(user_id).await?;

        let position = entries
            .iter()
            .position(|e| e.movie_id == movie_id)
            .ok_or_else(|| not_in_watchlist(movie_id))?;
        let removed = entries.remove(position);
        self.save(user_id, &entries).await?;

        tracing::info!(
            user_id = %user_id,
            movie_id,
            backend = self.kv.name(),
            "Removed movie from watchlist"
        );

        Ok(removed)
    }

    async fn list(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let mut entries = self.load(user_id).await?;
        sort_entries(&mut entries);
        Ok(entries)
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<usize> {
        let _guard = self.write_lock.lock().await;
        let entries = self.load(user_id).await?;

        if entries.is_empty() {
            return Ok(0);
        }

        self.save(user_id, &[]).await?;
        tracing::info!(user_id = %user_id, removed = entries.len(), "Cleared watchlist");

        Ok(entries.len())
    }

    async fn is_member(&self, user_id: Uuid, movie_id: i64) -> AppResult<bool> {
        let entries = self.load(user_id).await?;
        Ok(entries.iter().any(|e| e.movie_id == movie_id))
    }

    fn name(&self) -> &'static str {
        self.kv.name()
    }
}
