use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account owned by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name to show for the user: display name, else the email's local part
    pub fn display_label(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }

        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "User".to_string(),
        }
    }

    /// Avatar initials: first letters of the first two name words
    pub fn initials(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            let initials: String = name
                .split_whitespace()
                .take(2)
                .filter_map(|word| word.chars().next())
                .collect();
            return initials.to_uppercase();
        }

        self.email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }
}

/// Identity an OAuth provider asserted for a verified access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthProfile {
    /// Provider name, e.g. "google"
    pub provider: String,
    /// Provider-scoped user identifier
    pub subject: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the provider vouches for `email`
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// An authenticated session handed back on sign-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: Uuid,
    pub user: User,
}
