//! Input validation utilities.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::AuthError;

pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_PASSWORD_LENGTH: usize = 128;

static EMAIL_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"));

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AuthError::Validation("Email too long".to_string()));
    }

    let email_regex = EMAIL_REGEX
        .as_ref()
        .map_err(|_| AuthError::Validation("Invalid email regex".to_string()))?;

    if !email_regex.is_match(email) {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password must not be empty".to_string()));
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    Ok(())
}
