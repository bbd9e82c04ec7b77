use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{AppState, CurrentSession},
    error::AppResult,
    models::{Session, User},
    services::auth::validation::{check_password, PasswordCheck},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Access token from a completed OAuth flow
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSignInRequest {
    pub provider: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordStrengthRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    /// Name to show in the UI
    pub label: String,
    pub initials: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            label: user.display_label(),
            initials: user.initials(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: Uuid,
    pub user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: UserResponse::from(&session.user),
        }
    }
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let session = state
        .auth
        .sign_up(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.auth.sign_in(&request.email, &request.password).await?;
    Ok(Json(session.into()))
}

pub async fn sign_in_with_oauth(
    State(state): State<AppState>,
    Json(request): Json<OAuthSignInRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state
        .auth
        .sign_in_with_oauth(&request.provider, &request.access_token)
        .await?;
    Ok(Json(session.into()))
}

pub async fn sign_out(State(state): State<AppState>, session: CurrentSession) -> StatusCode {
    state.auth.sign_out(session.token).await;
    StatusCode::NO_CONTENT
}

pub async fn current_session(session: CurrentSession) -> Json<UserResponse> {
    Json(UserResponse::from(&session.user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .auth
        .update_display_name(session.token, &request.display_name)
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Grades a password for the sign-up form without storing anything
pub async fn password_strength(Json(request): Json<PasswordStrengthRequest>) -> Json<PasswordCheck> {
    Json(check_password(&request.password))
}
