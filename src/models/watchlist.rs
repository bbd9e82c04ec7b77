use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Movie;

/// Number of entries reported as recently added
const RECENTLY_ADDED_LIMIT: usize = 5;

/// A movie saved to a user's watchlist
///
/// Serialized with the field names the key-value backend stores
/// (`id`, `addedAt`), so one JSON array per user round-trips as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    #[serde(rename = "id")]
    pub movie_id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    /// Copies the persisted fields out of a catalog movie
    pub fn from_movie(movie: &Movie, added_at: DateTime<Utc>) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
            overview: movie.overview.clone(),
            added_at,
        }
    }

    /// Release year parsed from a `YYYY-MM-DD` release date
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map(|date| date.year())
    }
}

/// Orders entries oldest first, movie id breaking ties
pub fn sort_entries(entries: &mut [WatchlistEntry]) {
    entries.sort_by(|a, b| {
        a.added_at
            .cmp(&b.added_at)
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });
}

/// Summary figures for a watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistStats {
    pub total_movies: usize,
    /// Mean rating over all entries, rounded to one decimal
    pub average_rating: f64,
    pub most_common_year: Option<i32>,
    /// Newest first
    pub recently_added: Vec<WatchlistEntry>,
}

impl WatchlistStats {
    /// Computes stats from entries in list order (oldest first)
    pub fn from_entries(entries: &[WatchlistEntry]) -> Self {
        let total_movies = entries.len();

        let total_rating: f64 = entries.iter().filter_map(|e| e.vote_average).sum();
        let average_rating = if total_movies > 0 {
            (total_rating / total_movies as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        let mut years: HashMap<i32, usize> = HashMap::new();
        for year in entries.iter().filter_map(WatchlistEntry::release_year) {
            *years.entry(year).or_default() += 1;
        }
        // Highest count wins; the earliest year wins a tie
        let most_common_year = years
            .into_iter()
            .max_by(|(year_a, count_a), (year_b, count_b)| {
                count_a.cmp(count_b).then_with(|| year_b.cmp(year_a))
            })
            .map(|(year, _)| year);

        let recently_added = entries
            .iter()
            .rev()
            .take(RECENTLY_ADDED_LIMIT)
            .cloned()
            .collect();

        Self {
            total_movies,
            average_rating,
            most_common_year,
            recently_added,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(movie_id: i64, release_date: Option<&str>, vote: Option<f64>, minute: i64) -> WatchlistEntry {
        WatchlistEntry {
            movie_id,
            title: format!("Movie {}", movie_id),
            poster_path: None,
            release_date: release_date.map(str::to_string),
            vote_average: vote,
            overview: None,
            added_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let e = entry(27205, Some("2010-07-15"), Some(8.4), 0);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["id"], 27205);
        assert!(json.get("addedAt").is_some());
        assert!(json.get("movie_id").is_none());
    }

    #[test]
    fn test_release_year() {
        assert_eq!(entry(1, Some("1994-09-23"), None, 0).release_year(), Some(1994));
        assert_eq!(entry(1, Some(""), None, 0).release_year(), None);
        assert_eq!(entry(1, None, None, 0).release_year(), None);
    }

    #[test]
    fn test_sort_entries_by_added_at_then_id() {
        let mut entries = vec![entry(3, None, None, 5), entry(2, None, None, 1), entry(1, None, None, 1)];
        sort_entries(&mut entries);
        let ids: Vec<i64> = entries.iter().map(|e| e.movie_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_stats_empty() {
        let stats = WatchlistStats::from_entries(&[]);
        assert_eq!(stats.total_movies, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.most_common_year, None);
        assert!(stats.recently_added.is_empty());
    }

    #[test]
    fn test_stats_average_counts_unrated_entries() {
        let entries = vec![
            entry(1, Some("1994-09-23"), Some(8.7), 0),
            entry(2, Some("1994-06-23"), Some(8.4), 1),
            entry(3, Some("2010-07-15"), None, 2),
        ];
        let stats = WatchlistStats::from_entries(&entries);
        assert_eq!(stats.total_movies, 3);
        // (8.7 + 8.4) / 3 = 5.7
        assert_eq!(stats.average_rating, 5.7);
        assert_eq!(stats.most_common_year, Some(1994));
    }

    #[test]
    fn test_stats_year_tie_prefers_earliest() {
        let entries = vec![
            entry(1, Some("2010-07-15"), None, 0),
            entry(2, Some("1972-03-14"), None, 1),
        ];
        assert_eq!(WatchlistStats::from_entries(&entries).most_common_year, Some(1972));
    }

    #[test]
    fn test_stats_recently_added_newest_first() {
        let entries: Vec<WatchlistEntry> = (1..=7).map(|i| entry(i, None, None, i)).collect();
        let stats = WatchlistStats::from_entries(&entries);
        let ids: Vec<i64> = stats.recently_added.iter().map(|e| e.movie_id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }
}
