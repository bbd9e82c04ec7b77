use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{
    api::{AppState, CurrentSession},
    error::AppResult,
    models::{Movie, WatchlistEntry, WatchlistStats},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub movie_id: i64,
    pub in_watchlist: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

pub async fn list(
    State(state): State<AppState>,
    session: CurrentSession,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    Ok(Json(state.watchlist.list(session.user.id).await?))
}

/// Saves a movie as sent by the browse results
pub async fn add(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(movie): Json<Movie>,
) -> AppResult<(StatusCode, Json<WatchlistEntry>)> {
    let entry = state.watchlist.add(session.user.id, &movie).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<WatchlistEntry>> {
    Ok(Json(state.watchlist.remove(session.user.id, movie_id).await?))
}

pub async fn clear(
    State(state): State<AppState>,
    session: CurrentSession,
) -> AppResult<Json<ClearResponse>> {
    let removed = state.watchlist.clear(session.user.id).await?;
    Ok(Json(ClearResponse { removed }))
}

pub async fn membership(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<MembershipResponse>> {
    let in_watchlist = state.watchlist.is_member(session.user.id, movie_id).await?;
    Ok(Json(MembershipResponse {
        movie_id,
        in_watchlist,
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    session: CurrentSession,
) -> AppResult<Json<WatchlistStats>> {
    Ok(Json(state.watchlist.stats(session.user.id).await?))
}
