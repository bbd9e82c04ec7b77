//! Movie discovery and watchlist backend
//!
//! Search and browse movies through TMDB, keep a per-user watchlist, count
//! trending searches, and authenticate users, behind an axum JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
