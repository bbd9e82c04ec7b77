use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, auth, movies, trending, watchlist};
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(super::session::CLIENT_ID_HEADER),
        ]);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            // Request id first, so the trace span already sees it
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/signin", post(auth::sign_in))
        .route("/auth/oauth", post(auth::sign_in_with_oauth))
        .route("/auth/signout", post(auth::sign_out))
        .route("/auth/session", get(auth::current_session))
        .route("/auth/profile", patch(auth::update_profile))
        .route("/auth/password-strength", post(auth::password_strength))
        // Movies
        .route("/movies", get(movies::browse))
        .route("/movies/:id", get(movies::detail))
        .route("/movies/:id/credits", get(movies::credits))
        .route("/movies/:id/videos", get(movies::videos))
        .route("/movies/:id/page", get(movies::page))
        // Trending
        .route("/trending", get(trending::top_searches))
        // Watchlist
        .route(
            "/watchlist",
            get(watchlist::list)
                .post(watchlist::add)
                .delete(watchlist::clear),
        )
        .route("/watchlist/stats", get(watchlist::stats))
        .route(
            "/watchlist/:movie_id",
            get(watchlist::membership).delete(watchlist::remove),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::services::{auth::MockOAuthVerifier, catalog::MockMovieCatalog};

    fn router() -> Router {
        create_router(AppState::in_memory(
            Arc::new(MockMovieCatalog::new()),
            Arc::new(MockOAuthVerifier::new()),
        ))
    }

    #[tokio::test]
    async fn test_health_echoes_request_id() {
        let response = router()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-123");
    }

    #[tokio::test]
    async fn test_preflight_allows_client_id_header() {
        let response = router()
            .oneshot(
                Request::options("/api/v1/movies")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "GET")
                    .header("access-control-request-headers", "x-client-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(response.headers().contains_key("x-request-id"));
    }
}
