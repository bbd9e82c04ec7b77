use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::{error::AppError, models::User};

use super::AppState;

/// Header naming the browsing client when no session token is sent
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Reads the session token from `Authorization: Bearer <uuid>`
fn bearer_token(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| Uuid::parse_str(token.trim()).ok())
}

/// The signed-in user behind the request's bearer token
pub struct CurrentSession {
    pub token: Uuid,
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing or malformed session token".to_string()))?;
        let user = state.auth.current_user(token).await?;

        Ok(Self { token, user })
    }
}

/// Key grouping browse requests from one client
///
/// The session token when present, else the `x-client-id` header. Requests
/// with neither are never superseded.
pub struct ClientId(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(parts) {
            return Ok(Self(Some(format!("session:{}", token))));
        }

        let client = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| format!("client:{}", value));

        Ok(Self(client))
    }
}
