//! Authentication gateway
//!
//! [`AuthGateway`] fronts an [`IdentityProvider`] and owns the sessions
//! handed out on sign-in. Each session has a `watch` channel carrying the
//! signed-in user, so observers see the current value on subscribe and every
//! later transition (profile change, sign-out, expiry). Sessions idle for
//! longer than the configured timeout expire.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::{watch, RwLock},
    time::Instant,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Session, User},
};

mod kv;
mod oauth;
mod password;
mod postgres;
mod provider;
pub mod validation;

pub use kv::KeyValueIdentityProvider;
#[cfg(test)]
pub use oauth::MockOAuthVerifier;
pub use oauth::{OAuthVerifier, UserInfoVerifier, GOOGLE_USERINFO_URL};
pub use postgres::PostgresIdentityProvider;
pub use provider::{IdentityProvider, EMAIL_IN_USE, INVALID_CREDENTIALS};

/// Idle time after which a session expires unless configured otherwise
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const SESSION_NOT_FOUND: &str = "Not signed in";
const OAUTH_EMAIL_UNVERIFIED: &str = "The OAuth provider has not verified this email address";

struct SessionSlot {
    user_id: Uuid,
    tx: watch::Sender<Option<User>>,
    last_seen: Instant,
}

pub struct AuthGateway {
    provider: Arc<dyn IdentityProvider>,
    oauth: Arc<dyn OAuthVerifier>,
    sessions: RwLock<HashMap<Uuid, SessionSlot>>,
    idle_timeout: Duration,
}

impl AuthGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>, oauth: Arc<dyn OAuthVerifier>) -> Self {
        Self {
            provider,
            oauth,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Creates an account and signs it in
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<Session> {
        validation::validate_email(email)?;
        validation::validate_password(password)?;
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .map(validation::normalize_display_name)
            .transpose()?;

        let user = self
            .provider
            .create_account(email, password, display_name.as_deref())
            .await
            .inspect_err(|e| tracing::warn!(error = %e, provider = self.provider.name(), "Sign-up rejected"))?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(self.open_session(user).await)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        validation::validate_email(email)?;
        if password.is_empty() {
            return Err(AppError::InvalidInput("Password is required".to_string()));
        }

        let user = self
            .provider
            .authenticate(email, password)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, provider = self.provider.name(), "Sign-in rejected"))?;

        tracing::info!(user_id = %user.id, "User signed in");
        Ok(self.open_session(user).await)
    }

    /// Signs in with an access token from a completed OAuth flow
    ///
    /// The provider is asked who the token belongs to. A profile whose email
    /// the provider has not verified is refused.
    pub async fn sign_in_with_oauth(&self, provider: &str, access_token: &str) -> AppResult<Session> {
        if provider.trim().is_empty() || access_token.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "OAuth provider and access token are required".to_string(),
            ));
        }

        let profile = self
            .oauth
            .verify(provider, access_token)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, oauth_provider = %provider, "OAuth token verification failed"))?;

        if let Some(email) = profile.email.as_deref() {
            if !profile.email_verified {
                tracing::warn!(oauth_provider = %profile.provider, "OAuth sign-in with unverified email refused");
                return Err(AppError::Unauthorized(OAUTH_EMAIL_UNVERIFIED.to_string()));
            }
            validation::validate_email(email)?;
        }

        let user = self
            .provider
            .resolve_oauth(&profile)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, oauth_provider = %profile.provider, "OAuth sign-in rejected"))?;

        tracing::info!(user_id = %user.id, oauth_provider = %profile.provider, "User signed in with OAuth");
        Ok(self.open_session(user).await)
    }

    /// Ends a session; unknown tokens are ignored
    pub async fn sign_out(&self, token: Uuid) {
        let removed = self.sessions.write().await.remove(&token);

        match removed {
            Some(slot) => {
                slot.tx.send_replace(None);
                tracing::info!(user_id = %slot.user_id, "User signed out");
            }
            None => tracing::debug!(session = %token, "Sign-out for unknown session"),
        }
    }

    /// The user behind a session token; using a session keeps it alive
    pub async fn current_user(&self, token: Uuid) -> AppResult<User> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let expired = match sessions.get_mut(&token) {
            None => return Err(AppError::Unauthorized(SESSION_NOT_FOUND.to_string())),
            Some(slot) if now.duration_since(slot.last_seen) >= self.idle_timeout => true,
            Some(slot) => {
                slot.last_seen = now;
                false
            }
        };

        if expired {
            if let Some(slot) = sessions.remove(&token) {
                slot.tx.send_replace(None);
                tracing::info!(user_id = %slot.user_id, "Session expired");
            }
            return Err(AppError::Unauthorized(SESSION_NOT_FOUND.to_string()));
        }

        sessions
            .get(&token)
            .and_then(|slot| slot.tx.borrow().clone())
            .ok_or_else(|| AppError::Unauthorized(SESSION_NOT_FOUND.to_string()))
    }

    /// Observes a session's user
    ///
    /// The receiver reports a change immediately with the current value
    /// (`None` for an unknown or ended session) and again on every
    /// transition. After sign-out the sender is dropped, so `changed()`
    /// errors once `None` has been observed.
    pub async fn on_session_change(&self, token: Uuid) -> watch::Receiver<Option<User>> {
        let mut rx = match self.sessions.read().await.get(&token) {
            Some(slot) => slot.tx.subscribe(),
            None => watch::channel(None).1,
        };
        rx.mark_changed();
        rx
    }

    /// Changes the signed-in user's display name and notifies all of their sessions
    pub async fn update_display_name(&self, token: Uuid, display_name: &str) -> AppResult<User> {
        let display_name = validation::normalize_display_name(display_name)?;
        let user = self.current_user(token).await?;

        let updated = self
            .provider
            .update_display_name(user.id, &display_name)
            .await?;

        for slot in self
            .sessions
            .read()
            .await
            .values()
            .filter(|slot| slot.user_id == updated.id)
        {
            slot.tx.send_replace(Some(updated.clone()));
        }

        tracing::info!(user_id = %updated.id, "Display name updated");
        Ok(updated)
    }

    async fn open_session(&self, user: User) -> Session {
        let token = Uuid::new_v4();
        let (tx, _rx) = watch::channel(Some(user.clone()));
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        self.prune_expired(&mut sessions, now);
        sessions.insert(
            token,
            SessionSlot {
                user_id: user.id,
                tx,
                last_seen: now,
            },
        );

        Session { token, user }
    }

    /// Drops idle sessions, telling their observers they are signed out
    fn prune_expired(&self, sessions: &mut HashMap<Uuid, SessionSlot>, now: Instant) {
        sessions.retain(|_, slot| {
            let alive = now.duration_since(slot.last_seen) < self.idle_timeout;
            if !alive {
                slot.tx.send_replace(None);
                tracing::info!(user_id = %slot.user_id, "Session expired");
            }
            alive
        });
    }
}
