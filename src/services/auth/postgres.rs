use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    password::{hash_password, verify_password},
    provider::{linkable_email, normalize_email, IdentityProvider, EMAIL_IN_USE, INVALID_CREDENTIALS},
};
use crate::{
    error::{AppError, AppResult},
    models::{OAuthProfile, User},
};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            display_name: row.display_name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Identity provider backed by the `users` and `user_identities` tables
#[derive(Clone)]
pub struct PostgresIdentityProvider {
    pool: PgPool,
}

impl PostgresIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, user_id: Uuid) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn insert_user(
        &self,
        email: &str,
        display_name: Option<&str>,
        password_hash: Option<&str>,
    ) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, display_name, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| AppError::AlreadyExists(EMAIL_IN_USE.to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for PostgresIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;

        let user = self
            .insert_user(&email, display_name, Some(&password_hash))
            .await?;
        tracing::info!(user_id = %user.id, "Created user account");

        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let row = self
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        match row.password_hash.as_deref() {
            Some(hash) if verify_password(password, hash)? => Ok(row.into()),
            _ => Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string())),
        }
    }

    async fn resolve_oauth(&self, profile: &OAuthProfile) -> AppResult<User> {
        let linked = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.display_name, u.password_hash, u.created_at
            FROM user_identities i
            JOIN users u ON u.id = i.user_id
            WHERE i.provider = $1 AND i.subject = $2
            "#,
        )
        .bind(&profile.provider)
        .bind(&profile.subject)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = linked {
            return Ok(row.into());
        }

        let email = linkable_email(profile);
        let existing = match email.as_deref() {
            Some(email) => self.find_by_email(email).await?,
            None => None,
        };

        let user = match existing {
            Some(row) => User::from(row),
            None => {
                // Without a verified email the account gets a unique placeholder
                let email = email
                    .unwrap_or_else(|| format!("{}:{}", profile.provider, profile.subject));
                self.insert_user(&email, profile.display_name.as_deref(), None)
                    .await?
            }
        };

        // A concurrent sign-in may have linked the identity first; its link wins
        let linked_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO user_identities (provider, subject, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (provider, subject) DO UPDATE SET provider = EXCLUDED.provider
            RETURNING user_id
            "#,
        )
        .bind(&profile.provider)
        .bind(&profile.subject)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        if linked_id != user.id {
            return self.find_by_id(linked_id).await;
        }

        tracing::info!(user_id = %user.id, provider = %profile.provider, "Linked OAuth identity");
        Ok(user)
    }

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET display_name = $2
            WHERE id = $1
            RETURNING id, email, display_name, password_hash, created_at
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
