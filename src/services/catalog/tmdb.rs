/// TMDB v3 REST client
///
/// Authenticates with a v4 read access token sent as a bearer token. Every
/// response goes through the read-through [`Cache`], which is a no-op unless
/// Redis caching is enabled.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Credits, MovieDetail, MoviePage, VideoList},
    services::catalog::MovieCatalog,
};
use reqwest::{header::ACCEPT, Client as HttpClient};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_token: String,
    api_url: String,
    cache: Cache,
}

impl TmdbClient {
    pub fn new(cache: Cache, api_token: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// GETs `path` relative to the API root and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, path, "TMDB request failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, path, "TMDB returned an error status");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbClient {
    async fn search(&self, query: &str) -> AppResult<MoviePage> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let key = CacheKey::Search(query.to_string());
        let ttl = key.ttl();
        cached!(self.cache, key, ttl, async move {
            let page = self
                .get_json::<MoviePage>("search/movie", &[("query", query)])
                .await;
            if let Ok(page) = &page {
                tracing::info!(
                    query = %query,
                    results = page.results.len(),
                    provider = "tmdb",
                    "Movie search completed"
                );
            }
            page
        })
    }

    async fn discover(&self) -> AppResult<MoviePage> {
        let key = CacheKey::Discover;
        let ttl = key.ttl();
        cached!(self.cache, key, ttl, async move {
            self.get_json::<MoviePage>("discover/movie", &[("sort_by", "popularity.desc")])
                .await
        })
    }

    async fn detail(&self, id: i64) -> AppResult<MovieDetail> {
        let key = CacheKey::Detail(id);
        let ttl = key.ttl();
        cached!(self.cache, key, ttl, async move {
            self.get_json::<MovieDetail>(&format!("movie/{}", id), &[])
                .await
        })
    }

    async fn credits(&self, id: i64) -> AppResult<Credits> {
        let key = CacheKey::Credits(id);
        let ttl = key.ttl();
        cached!(self.cache, key, ttl, async move {
            self.get_json::<Credits>(&format!("movie/{}/credits", id), &[])
                .await
        })
    }

    async fn videos(&self, id: i64) -> AppResult<VideoList> {
        let key = CacheKey::Videos(id);
        let ttl = key.ttl();
        cached!(self.cache, key, ttl, async move {
            self.get_json::<VideoList>(&format!("movie/{}/videos", id), &[])
                .await
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
