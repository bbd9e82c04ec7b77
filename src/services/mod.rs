pub mod auth;
pub mod browse;
pub mod catalog;
pub mod trending;
pub mod watchlist;
