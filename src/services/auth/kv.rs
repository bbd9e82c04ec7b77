use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    password::{hash_password, verify_password},
    provider::{linkable_email, normalize_email, IdentityProvider, EMAIL_IN_USE, INVALID_CREDENTIALS},
};
use crate::{
    db::KeyValueStore,
    error::{AppError, AppResult},
    models::{OAuthProfile, User},
};

/// What is stored under `user_<id>`
#[derive(Serialize, Deserialize)]
struct StoredAccount {
    user: User,
    /// `None` for accounts created through OAuth only
    password_hash: Option<String>,
}

/// Identity provider keeping accounts in a key-value store
///
/// Layout: `user_<id>` holds the account JSON, `user_email_<email>` and
/// `user_identity_<provider>_<subject>` hold the owning user id. Index keys
/// are claimed with `set_if_absent`, so an email or OAuth identity maps to
/// one account even across processes sharing Redis.
pub struct KeyValueIdentityProvider {
    kv: Arc<dyn KeyValueStore>,
    /// Serializes profile read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl KeyValueIdentityProvider {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    fn account_key(user_id: Uuid) -> String {
        format!("user_{}", user_id)
    }

    fn email_key(email: &str) -> String {
        format!("user_email_{}", email)
    }

    fn identity_key(provider: &str, subject: &str) -> String {
        format!("user_identity_{}_{}", provider, subject)
    }

    async fn load(&self, user_id: Uuid) -> AppResult<Option<StoredAccount>> {
        let Some(json) = self.kv.get(&Self::account_key(user_id)).await? else {
            return Ok(None);
        };

        let account = serde_json::from_str(&json).map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Stored account is not valid JSON");
            AppError::Internal(format!("Failed to load account: {}", e))
        })?;
        Ok(Some(account))
    }

    async fn save(&self, account: &StoredAccount) -> AppResult<()> {
        let json = serde_json::to_string(account)?;
        self.kv.set(&Self::account_key(account.user.id), json).await
    }

    /// Follows an index key to the account it points at
    async fn load_indexed(&self, index_key: &str) -> AppResult<Option<StoredAccount>> {
        let Some(id) = self.kv.get(index_key).await? else {
            return Ok(None);
        };

        match Uuid::parse_str(&id) {
            Ok(user_id) => self.load(user_id).await,
            Err(e) => {
                tracing::error!(key = index_key, error = %e, "Index key holds an invalid user id");
                Ok(None)
            }
        }
    }

    /// Writes a new account and claims its email
    ///
    /// Returns `None` when another account already owns the email.
    async fn insert(&self, account: StoredAccount) -> AppResult<Option<User>> {
        self.save(&account).await?;

        let claimed = self
            .kv
            .set_if_absent(&Self::email_key(&account.user.email), account.user.id.to_string())
            .await?;
        if !claimed {
            self.kv.delete(&Self::account_key(account.user.id)).await?;
            return Ok(None);
        }

        tracing::info!(user_id = %account.user.id, backend = self.kv.name(), "Created user account");
        Ok(Some(account.user))
    }

    /// Points an OAuth identity at `user`, deferring to an earlier link
    async fn link(&self, identity_key: &str, user: User) -> AppResult<User> {
        let linked = self
            .kv
            .set_if_absent(identity_key, user.id.to_string())
            .await?;
        if linked {
            return Ok(user);
        }

        self.load_indexed(identity_key)
            .await?
            .map(|account| account.user)
            .ok_or_else(|| AppError::Internal("OAuth identity points at a missing account".to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for KeyValueIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        if self.load_indexed(&Self::email_key(&email)).await?.is_some() {
            return Err(AppError::AlreadyExists(EMAIL_IN_USE.to_string()));
        }

        let account = StoredAccount {
            user: User {
                id: Uuid::new_v4(),
                display_name: display_name.map(str::to_string),
                email,
                created_at: Utc::now(),
            },
            password_hash: Some(hash_password(password)?),
        };

        self.insert(account)
            .await?
            .ok_or_else(|| AppError::AlreadyExists(EMAIL_IN_USE.to_string()))
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let account = self
            .load_indexed(&Self::email_key(&normalize_email(email)))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        match account.password_hash.as_deref() {
            Some(hash) if verify_password(password, hash)? => Ok(account.user),
            _ => Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string())),
        }
    }

    async fn resolve_oauth(&self, profile: &OAuthProfile) -> AppResult<User> {
        let identity_key = Self::identity_key(&profile.provider, &profile.subject);
        if let Some(account) = self.load_indexed(&identity_key).await? {
            return Ok(account.user);
        }

        let email = linkable_email(profile);
        if let Some(email) = email.as_deref() {
            if let Some(account) = self.load_indexed(&Self::email_key(email)).await? {
                return self.link(&identity_key, account.user).await;
            }
        }

        // Without a verified email the account gets a unique placeholder
        let email = email.unwrap_or_else(|| format!("{}:{}", profile.provider, profile.subject));
        let account = StoredAccount {
            user: User {
                id: Uuid::new_v4(),
                display_name: profile.display_name.clone(),
                email: email.clone(),
                created_at: Utc::now(),
            },
            password_hash: None,
        };

        let user = match self.insert(account).await? {
            Some(user) => user,
            // Someone claimed the email in between; join that account
            None => self
                .load_indexed(&Self::email_key(&email))
                .await?
                .map(|account| account.user)
                .ok_or_else(|| AppError::AlreadyExists(EMAIL_IN_USE.to_string()))?,
        };

        self.link(&identity_key, user).await
    }

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> AppResult<User> {
        let _guard = self.write_lock.lock().await;
        let mut account = self
            .load(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        account.user.display_name = Some(display_name.to_string());
        self.save(&account).await?;
        Ok(account.user)
    }

    fn name(&self) -> &'static str {
        self.kv.name()
    }
}
