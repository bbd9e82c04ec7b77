use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{OAuthProfile, User},
};

/// Message returned for any failed email/password sign-in
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Message returned when signing up with an email that is taken
pub const EMAIL_IN_USE: &str = "An account with this email already exists";

/// An identity provider owning user accounts
///
/// Errors carry the provider's own message, which the gateway passes on
/// unchanged.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an email/password account
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<User>;

    /// Checks email/password credentials
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;

    /// Finds or creates the account linked to an OAuth identity
    ///
    /// An unseen identity is linked to an existing account with the same
    /// email only when the provider verified that email; otherwise it gets a
    /// new account.
    async fn resolve_oauth(&self, profile: &OAuthProfile) -> AppResult<User>;

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> AppResult<User>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Emails compare case-insensitively
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The profile email usable for account lookup: present and provider-verified
pub(crate) fn linkable_email(profile: &OAuthProfile) -> Option<String> {
    profile
        .email
        .as_deref()
        .filter(|_| profile.email_verified)
        .map(normalize_email)
        .filter(|email| !email.is_empty())
}
