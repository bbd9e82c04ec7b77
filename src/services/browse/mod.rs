//! Search and discovery for the browse screen
//!
//! [`BrowseService`] picks search or discover from the query, falls back to
//! the demo list when discovery is unreachable, records trending terms, and
//! drops responses that a newer request from the same client has superseded.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::BrowsePage,
    services::{catalog::demo::demo_page, catalog::MovieCatalog, trending::MetricStore},
};

mod generations;

pub use generations::{GenerationTicket, RequestGenerations};

pub struct BrowseService {
    catalog: Arc<dyn MovieCatalog>,
    trending: Arc<dyn MetricStore>,
    generations: RequestGenerations,
}

impl BrowseService {
    pub fn new(catalog: Arc<dyn MovieCatalog>, trending: Arc<dyn MetricStore>) -> Self {
        Self {
            catalog,
            trending,
            generations: RequestGenerations::new(),
        }
    }

    /// Searches when `query` has text, otherwise lists popular movies
    ///
    /// Fails with `Superseded` when `client` issued another browse request
    /// before this one completed. Anonymous requests are never superseded.
    pub async fn browse(&self, client: Option<&str>, query: Option<&str>) -> AppResult<BrowsePage> {
        let ticket = match client {
            Some(client) => Some(self.generations.issue(client).await),
            None => None,
        };
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let result = match query {
            Some(q) => self.catalog.search(q).await,
            None => self.catalog.discover().await,
        };

        if let Some(ticket) = &ticket {
            if !self.generations.complete(ticket).await {
                tracing::debug!(
                    client = ticket.client(),
                    generation = ticket.generation(),
                    "Discarding superseded browse response"
                );
                return Err(AppError::Superseded);
            }
        }

        let page = match (result, query) {
            (Ok(page), _) => page,
            (Err(e), None) => {
                tracing::warn!(
                    error = %e,
                    catalog = self.catalog.name(),
                    "Discover failed, serving demo movies"
                );
                return Ok(BrowsePage::demo(demo_page()));
            }
            (Err(e), Some(q)) => {
                tracing::error!(error = %e, query = %q, "Movie search failed");
                return Err(e);
            }
        };

        if let (Some(term), Some(first)) = (query, page.results.first()) {
            if let Err(e) = self.trending.record_search(term, first).await {
                tracing::error!(
                    error = %e,
                    term,
                    store = self.trending.name(),
                    "Failed to record search"
                );
            }
        }

        Ok(BrowsePage::live(page))
    }
}
