use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{AppState, ClientId},
    error::AppResult,
    models::{BrowsePage, Credits, MovieDetail, MovieOverview, VideoList},
    services::catalog::movie_overview,
};

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub query: Option<String>,
}

/// Searches by title, or lists popular movies when no query is given
pub async fn browse(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    Query(params): Query<BrowseQuery>,
) -> AppResult<Json<BrowsePage>> {
    let page = state
        .browse
        .browse(client.as_deref(), params.query.as_deref())
        .await?;
    Ok(Json(page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MovieDetail>> {
    Ok(Json(state.catalog.detail(id).await?))
}

pub async fn credits(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Credits>> {
    Ok(Json(state.catalog.credits(id).await?))
}

pub async fn videos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<VideoList>> {
    Ok(Json(state.catalog.videos(id).await?))
}

/// Detail, top-billed cast and trailers in one response
pub async fn page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MovieOverview>> {
    let overview = movie_overview(state.catalog.as_ref(), id).await?;
    Ok(Json(overview))
}
