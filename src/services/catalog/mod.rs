//! Movie catalog access
//!
//! [`MovieCatalog`] is a read-only pass-through to the external movie
//! metadata API. [`TmdbClient`] is the production implementation; the
//! built-in demo list in [`demo`] stands in when discovery is unreachable.

use crate::{
    error::AppResult,
    models::{Credits, MovieDetail, MovieOverview, MoviePage, Video, VideoList},
};

pub mod demo;
pub mod tmdb;

pub use tmdb::TmdbClient;

/// Cast members shown on a movie page
const OVERVIEW_CAST_LIMIT: usize = 8;
/// Trailers shown on a movie page
const OVERVIEW_TRAILER_LIMIT: usize = 3;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Movies matching a title query
    async fn search(&self, query: &str) -> AppResult<MoviePage>;

    /// Popular movies, most popular first
    async fn discover(&self) -> AppResult<MoviePage>;

    async fn detail(&self, id: i64) -> AppResult<MovieDetail>;

    async fn credits(&self, id: i64) -> AppResult<Credits>;

    async fn videos(&self, id: i64) -> AppResult<VideoList>;

    /// Catalog name for logging
    fn name(&self) -> &'static str;
}

/// Fetches detail, credits and videos for one movie concurrently
///
/// Fails as a whole if any of the three calls fails.
pub async fn movie_overview(catalog: &dyn MovieCatalog, id: i64) -> AppResult<MovieOverview> {
    let (movie, credits, videos) =
        tokio::try_join!(catalog.detail(id), catalog.credits(id), catalog.videos(id))?;

    Ok(MovieOverview {
        movie,
        cast: credits
            .cast
            .into_iter()
            .take(OVERVIEW_CAST_LIMIT)
            .collect(),
        trailers: videos
            .results
            .into_iter()
            .filter(Video::is_trailer)
            .take(OVERVIEW_TRAILER_LIMIT)
            .collect(),
    })
}
