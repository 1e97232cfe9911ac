/// Input validators
///
/// Pure validation functions for the auth request payloads. Each returns the
/// normalized value or a `FieldError` naming the offending field; flow
/// handlers collect these into a single 400 response.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldError;
use crate::store::Role;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_NAME_LENGTH: usize = 256;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt input limit

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates and normalizes an email address.
/// Emails are stored trimmed and lowercased so lookups are case-insensitive.
pub fn validate_email(email: &str) -> Result<String, FieldError> {
    let normalized = email.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(FieldError::new("email", "email is required"));
    }

    if normalized.len() > MAX_EMAIL_LENGTH {
        return Err(FieldError::new("email", "email is too long"));
    }

    if normalized.matches('@').count() != 1 || !EMAIL_REGEX.is_match(&normalized) {
        return Err(FieldError::new("email", "provide valid email"));
    }

    Ok(normalized)
}

/// Validates a password before hashing.
pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(FieldError::new("password", "password min 6 chars"));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(FieldError::new("password", "password is too long"));
    }

    Ok(())
}

/// Validates an optional display name. Absent names default to empty.
pub fn validate_name(name: Option<&str>) -> Result<String, FieldError> {
    let trimmed = match name {
        None => return Ok(String::new()),
        Some(name) => name.trim(),
    };

    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(FieldError::new("name", "name is too long"));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FieldError::new("name", "name contains invalid characters"));
    }

    Ok(trimmed.to_string())
}

/// Validates an optional role. Absent roles default to `user`.
pub fn validate_role(role: Option<&str>) -> Result<Role, FieldError> {
    match role {
        None => Ok(Role::User),
        Some("user") => Ok(Role::User),
        Some("admin") => Ok(Role::Admin),
        Some(_) => Err(FieldError::new("role", "role must be user or admin")),
    }
}
