use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::AppState,
    error::{AppError, AppResult},
    models::SearchMetric,
    services::trending::DEFAULT_TRENDING_LIMIT,
};

const MAX_TRENDING_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn top_searches(
    State(state): State<AppState>,
    Query(params): Query<TrendingQuery>,
) -> AppResult<Json<Vec<SearchMetric>>> {
    let limit = params.limit.unwrap_or(DEFAULT_TRENDING_LIMIT);
    if limit == 0 || limit > MAX_TRENDING_LIMIT {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_TRENDING_LIMIT
        )));
    }

    let metrics = state
        .trending
        .top_n(limit)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load trending searches"))?;
    Ok(Json(metrics))
}
