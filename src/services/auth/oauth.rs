//! Server-side verification of OAuth access tokens
//!
//! Clients finish the provider's authorization flow themselves and hand the
//! resulting access token to the API. The token is only trusted after the
//! provider's OpenID Connect userinfo endpoint accepts it; the identity used
//! for sign-in is whatever that endpoint returns, never client-supplied.

use std::collections::HashMap;

use reqwest::{header::ACCEPT, Client as HttpClient, StatusCode};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::OAuthProfile,
};

/// Google's OpenID Connect userinfo endpoint
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OAuthVerifier: Send + Sync {
    /// Resolves an access token to the identity the provider asserts for it
    async fn verify(&self, provider: &str, access_token: &str) -> AppResult<OAuthProfile>;
}

/// Standard OIDC userinfo claims
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies tokens against each configured provider's userinfo endpoint
#[derive(Clone, Default)]
pub struct UserInfoVerifier {
    http_client: HttpClient,
    userinfo_urls: HashMap<String, String>,
}

impl UserInfoVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts tokens for `provider`, checked at `userinfo_url`
    pub fn with_provider(mut self, provider: &str, userinfo_url: &str) -> Self {
        self.userinfo_urls
            .insert(provider.to_lowercase(), userinfo_url.to_string());
        self
    }
}

#[async_trait::async_trait]
impl OAuthVerifier for UserInfoVerifier {
    async fn verify(&self, provider: &str, access_token: &str) -> AppResult<OAuthProfile> {
        let provider = provider.trim().to_lowercase();
        let url = self
            .userinfo_urls
            .get(&provider)
            .ok_or_else(|| AppError::InvalidInput(format!("Unsupported OAuth provider: {}", provider)))?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, provider = %provider, "Userinfo request failed"))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::warn!(provider = %provider, "OAuth access token rejected");
                return Err(AppError::Unauthorized(format!(
                    "{} rejected the access token",
                    provider
                )));
            }
            status => {
                return Err(AppError::ExternalApi(format!(
                    "{} userinfo returned status {}",
                    provider, status
                )));
            }
        }

        let info: UserInfo = response.json().await.map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse {} userinfo: {}", provider, e))
        })?;

        Ok(OAuthProfile {
            provider,
            subject: info.sub,
            email: info.email,
            email_verified: info.email_verified,
            display_name: info.name,
        })
    }
}
