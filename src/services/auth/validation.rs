//! Credential checks applied before a request reaches the identity provider

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::{AppError, AppResult};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_DISPLAY_NAME_LENGTH: usize = 100;
const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Validate email format
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::InvalidInput("Email is required".to_string()));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex"));

    if !regex.is_match(email) {
        return Err(AppError::InvalidInput("Invalid email format".to_string()));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

/// Which password requirements are met
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PasswordRequirements {
    pub min_length: bool,
    pub has_upper_case: bool,
    pub has_lower_case: bool,
    pub has_number: bool,
    pub has_special_char: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PasswordCheck {
    /// Length, upper, lower and digit are required; the special character only adds strength
    pub is_valid: bool,
    pub requirements: PasswordRequirements,
    pub strength: PasswordStrength,
}

/// Grades a password without rejecting it
pub fn check_password(password: &str) -> PasswordCheck {
    let requirements = PasswordRequirements {
        min_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
        has_upper_case: password.chars().any(|c| c.is_ascii_uppercase()),
        has_lower_case: password.chars().any(|c| c.is_ascii_lowercase()),
        has_number: password.chars().any(|c| c.is_ascii_digit()),
        has_special_char: password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
    };

    let is_valid = requirements.min_length
        && requirements.has_upper_case
        && requirements.has_lower_case
        && requirements.has_number;

    let score = [
        requirements.min_length,
        requirements.has_upper_case,
        requirements.has_lower_case,
        requirements.has_number,
        requirements.has_special_char,
    ]
    .into_iter()
    .filter(|met| *met)
    .count();

    let strength = match score {
        0..=2 => PasswordStrength::Weak,
        3..=4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    };

    PasswordCheck {
        is_valid,
        requirements,
        strength,
    }
}

/// Validate password for account creation
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    let check = check_password(password);
    let requirements = &check.requirements;

    if !requirements.min_length {
        return Err(AppError::InvalidInput(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if !requirements.has_upper_case {
        return Err(AppError::InvalidInput(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !requirements.has_lower_case {
        return Err(AppError::InvalidInput(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !requirements.has_number {
        return Err(AppError::InvalidInput(
            "Password must contain at least one digit".to_string(),
        ));
    }

    Ok(())
}

/// Trims a display name and checks its length
pub fn normalize_display_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Display name is required".to_string()));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AppError::InvalidInput(
            "Display name must be at most 100 characters long".to_string(),
        ));
    }
    Ok(name.to_string())
}
