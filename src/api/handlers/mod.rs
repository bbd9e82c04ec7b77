use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub mod auth;
pub mod movies;
pub mod trending;
pub mod watchlist;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
