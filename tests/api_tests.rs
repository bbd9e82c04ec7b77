use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinelist_api::{
    api::{create_router, AppState},
    error::{AppError, AppResult},
    models::{CastMember, Credits, Movie, MovieDetail, MoviePage, OAuthProfile, Video, VideoList},
    services::{auth::OAuthVerifier, catalog::MovieCatalog},
};

/// Catalog with a fixed set of movies; discovery is unreachable
struct FakeCatalog;

fn movie(id: i64, title: &str, release_date: &str, vote_average: f64) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: Some(format!("{} overview", title)),
        poster_path: Some(format!("/{}.jpg", id)),
        backdrop_path: None,
        release_date: Some(release_date.to_string()),
        vote_average: Some(vote_average),
        vote_count: Some(1000),
        original_language: Some("en".to_string()),
        genre_ids: vec![878],
    }
}

fn catalog_movies() -> Vec<Movie> {
    vec![
        movie(438631, "Dune", "2021-10-22", 7.8),
        movie(693134, "Dune: Part Two", "2024-02-27", 8.2),
        movie(27205, "Inception", "2010-07-15", 8.4),
    ]
}

#[async_trait::async_trait]
impl MovieCatalog for FakeCatalog {
    async fn search(&self, query: &str) -> AppResult<MoviePage> {
        let query = query.to_lowercase();
        let results: Vec<Movie> = catalog_movies()
            .into_iter()
            .filter(|m| m.title.to_lowercase().contains(&query))
            .collect();
        Ok(MoviePage {
            page: 1,
            total_pages: 1,
            total_results: results.len() as u64,
            results,
        })
    }

    async fn discover(&self) -> AppResult<MoviePage> {
        Err(AppError::ExternalApi(
            "TMDB API returned status 503: unavailable".to_string(),
        ))
    }

    async fn detail(&self, id: i64) -> AppResult<MovieDetail> {
        let movie = catalog_movies()
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))?;
        Ok(MovieDetail {
            id: movie.id,
            title: movie.title,
            tagline: None,
            overview: movie.overview,
            poster_path: movie.poster_path,
            backdrop_path: None,
            release_date: movie.release_date,
            runtime: Some(148),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            status: Some("Released".to_string()),
            genres: vec![],
        })
    }

    async fn credits(&self, id: i64) -> AppResult<Credits> {
        let cast = (0..10)
            .map(|i| CastMember {
                id: i,
                name: format!("Actor {}", i),
                character: None,
                profile_path: None,
                order: Some(i as u32),
            })
            .collect();
        Ok(Credits {
            id,
            cast,
            crew: vec![],
        })
    }

    async fn videos(&self, id: i64) -> AppResult<VideoList> {
        let video = |key: &str, video_type: &str| Video {
            key: key.to_string(),
            name: format!("{} {}", video_type, key),
            site: "YouTube".to_string(),
            video_type: video_type.to_string(),
            official: Some(true),
        };
        Ok(VideoList {
            id,
            results: vec![
                video("a", "Teaser"),
                video("b", "Trailer"),
                video("c", "Trailer"),
                video("d", "Featurette"),
                video("e", "Trailer"),
                video("f", "Trailer"),
            ],
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// OAuth provider that knows two access tokens
struct FakeVerifier;

#[async_trait::async_trait]
impl OAuthVerifier for FakeVerifier {
    async fn verify(&self, provider: &str, access_token: &str) -> AppResult<OAuthProfile> {
        let profile = |subject: &str, email: &str, email_verified: bool, name: Option<&str>| OAuthProfile {
            provider: provider.to_string(),
            subject: subject.to_string(),
            email: Some(email.to_string()),
            email_verified,
            display_name: name.map(str::to_string),
        };

        match access_token {
            "chani-token" => Ok(profile("g-123", "chani@arrakis.test", true, Some("Chani"))),
            // Provider vouches for the subject but not the email
            "forged-victim" => Ok(profile("x", "victim@example.com", false, None)),
            _ => Err(AppError::Unauthorized(format!("{} rejected the access token", provider))),
        }
    }
}

fn create_test_server() -> TestServer {
    let state = AppState::in_memory(Arc::new(FakeCatalog), Arc::new(FakeVerifier));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// Signs up a fresh account and returns its session token
async fn sign_up(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/v1/auth/signup")
        .json(&json!({
            "email": email,
            "password": "Secret123!",
            "displayName": "Paul Atreides"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();

    let response = server
        .get("/health")
        .add_header(
            "x-request-id".parse::<axum::http::HeaderName>().unwrap(),
            HeaderValue::from_static("trace-abc"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-abc");

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_sign_up_sign_in_and_session() {
    let server = create_test_server();
    let token = sign_up(&server, "paul@arrakis.test").await;

    let response = server
        .get("/api/v1/auth/session")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["email"], "paul@arrakis.test");
    assert_eq!(user["label"], "Paul Atreides");
    assert_eq!(user["initials"], "PA");

    let response = server
        .post("/api/v1/auth/signin")
        .json(&json!({ "email": "paul@arrakis.test", "password": "Secret123!" }))
        .await;
    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["user"]["email"], "paul@arrakis.test");
}

#[tokio::test]
async fn test_sign_in_with_wrong_password_is_unauthorized() {
    let server = create_test_server();
    sign_up(&server, "paul@arrakis.test").await;

    let response = server
        .post("/api/v1/auth/signin")
        .json(&json!({ "email": "paul@arrakis.test", "password": "Wrong123!" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() {
    let server = create_test_server();
    sign_up(&server, "paul@arrakis.test").await;

    let response = server
        .post("/api/v1/auth/signup")
        .json(&json!({ "email": "paul@arrakis.test", "password": "Secret123!" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/auth/signup")
        .json(&json!({ "email": "leto@arrakis.test", "password": "short" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_out_ends_session() {
    let server = create_test_server();
    let token = sign_up(&server, "paul@arrakis.test").await;

    server
        .post("/api/v1/auth/signout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/api/v1/auth/session")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oauth_sign_in_reuses_account() {
    let server = create_test_server();
    let request = json!({ "provider": "google", "accessToken": "chani-token" });

    let first: Value = server.post("/api/v1/auth/oauth").json(&request).await.json();
    let second: Value = server.post("/api/v1/auth/oauth").json(&request).await.json();

    assert_eq!(first["user"]["id"], second["user"]["id"]);
    assert_ne!(first["token"], second["token"]);
    assert_eq!(first["user"]["label"], "Chani");
}

#[tokio::test]
async fn test_oauth_rejected_token_is_unauthorized() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/auth/oauth")
        .json(&json!({ "provider": "google", "accessToken": "made-up" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oauth_cannot_take_over_account_by_email() {
    let server = create_test_server();
    let victim = sign_up(&server, "victim@example.com").await;
    server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&victim))
        .json(&json!({ "id": 42, "title": "The Hitchhiker's Guide to the Galaxy" }))
        .await
        .assert_status(StatusCode::CREATED);

    // A bare profile is no longer accepted
    let response = server
        .post("/api/v1/auth/oauth")
        .json(&json!({ "provider": "evil", "subject": "x", "email": "victim@example.com" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // A real token whose email the provider never verified
    let response = server
        .post("/api/v1/auth/oauth")
        .json(&json!({ "provider": "evil", "accessToken": "forged-victim" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body.get("token").is_none());

    let entries: Vec<Value> = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&victim))
        .await
        .json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], 42);
}

#[tokio::test]
async fn test_update_profile() {
    let server = create_test_server();
    let token = sign_up(&server, "paul@arrakis.test").await;

    let response = server
        .patch("/api/v1/auth/profile")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "displayName": "Muad'Dib" }))
        .await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["displayName"], "Muad'Dib");
    assert_eq!(user["initials"], "M");
}

#[tokio::test]
async fn test_password_strength() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/auth/password-strength")
        .json(&json!({ "password": "Secret123!" }))
        .await;
    response.assert_status_ok();
    let check: Value = response.json();
    assert_eq!(check["is_valid"], true);
    assert_eq!(check["strength"], "strong");
}

#[tokio::test]
async fn test_watchlist_requires_session() {
    let server = create_test_server();

    server
        .get("/api/v1/watchlist")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer("not-a-token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_watchlist_add_list_remove() {
    let server = create_test_server();
    let token = sign_up(&server, "paul@arrakis.test").await;
    let dune = json!(catalog_movies()[0]);

    let response = server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&dune)
        .await;
    response.assert_status(StatusCode::CREATED);
    let entry: Value = response.json();
    assert_eq!(entry["id"], 438631);
    assert!(entry["addedAt"].is_string());

    // Same movie again
    let response = server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&dune)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let entries: Vec<Value> = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(entries.len(), 1);

    let membership: Value = server
        .get("/api/v1/watchlist/438631")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(membership["inWatchlist"], true);

    server
        .delete("/api/v1/watchlist/438631")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    server
        .delete("/api/v1/watchlist/438631")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let entries: Vec<Value> = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_watchlists_are_per_user() {
    let server = create_test_server();
    let paul = sign_up(&server, "paul@arrakis.test").await;
    let jessica = sign_up(&server, "jessica@arrakis.test").await;

    server
        .post("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&paul))
        .json(&json!(catalog_movies()[0]))
        .await
        .assert_status(StatusCode::CREATED);

    let entries: Vec<Value> = server
        .get("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&jessica))
        .await
        .json();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_watchlist_stats_and_clear() {
    let server = create_test_server();
    let token = sign_up(&server, "paul@arrakis.test").await;

    for movie in catalog_movies() {
        server
            .post("/api/v1/watchlist")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&movie)
            .await
            .assert_status(StatusCode::CREATED);
    }

    let stats: Value = server
        .get("/api/v1/watchlist/stats")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(stats["total_movies"], 3);
    assert_eq!(stats["average_rating"], 8.1);
    assert_eq!(stats["recently_added"].as_array().unwrap().len(), 3);

    let cleared: Value = server
        .delete("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(cleared["removed"], 3);

    let cleared: Value = server
        .delete("/api/v1/watchlist")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(cleared["removed"], 0);
}

#[tokio::test]
async fn test_search_records_trending() {
    let server = create_test_server();

    for _ in 0..3 {
        let page: Value = server
            .get("/api/v1/movies")
            .add_query_param("query", "dune")
            .await
            .json();
        assert_eq!(page["demo"], false);
        assert_eq!(page["results"].as_array().unwrap().len(), 2);
    }
    server
        .get("/api/v1/movies")
        .add_query_param("query", "inception")
        .await
        .assert_status_ok();

    let trending: Vec<Value> = server
        .get("/api/v1/trending")
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(trending.len(), 1);
    assert_eq!(trending[0]["search_term"], "dune");
    assert_eq!(trending[0]["count"], 3);
    assert_eq!(trending[0]["movie_id"], 438631);
}

#[tokio::test]
async fn test_trending_rejects_zero_limit() {
    let server = create_test_server();
    server
        .get("/api/v1/trending")
        .add_query_param("limit", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_browse_without_query_falls_back_to_demo() {
    let server = create_test_server();

    let page: Value = server.get("/api/v1/movies").await.json();
    assert_eq!(page["demo"], true);
    assert_eq!(page["results"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_movie_page_limits_cast_and_trailers() {
    let server = create_test_server();

    let response = server.get("/api/v1/movies/27205/page").await;
    response.assert_status_ok();
    let overview: Value = response.json();
    assert_eq!(overview["movie"]["title"], "Inception");
    assert_eq!(overview["cast"].as_array().unwrap().len(), 8);

    let trailers = overview["trailers"].as_array().unwrap();
    assert_eq!(trailers.len(), 3);
    assert!(trailers.iter().all(|v| v["type"] == "Trailer"));
}

#[tokio::test]
async fn test_unknown_movie_is_not_found() {
    let server = create_test_server();
    server
        .get("/api/v1/movies/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
