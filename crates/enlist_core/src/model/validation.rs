//! Input normalization for names, item content, emails and passwords.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

// Deliberately loose: one `@`, no whitespace, a dot somewhere in the domain.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Malformed user input. Callers re-prompt; never a server fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum ValidationError {
    /// User or list name is blank after trim.
    EmptyName,
    /// Item content is blank after trim.
    EmptyContent,
    /// Password is empty.
    EmptyPassword,
    /// Email does not look like an address.
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be blank"),
            Self::EmptyContent => write!(f, "item content must not be blank"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Trims a user or list name, rejecting blank input.
pub fn normalize_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Trims item content, rejecting blank input.
pub fn normalize_content(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

/// Trims and lowercases an email, then checks its shape.
///
/// Emails are compared case-insensitively everywhere, so the normalized form
/// is what gets stored and looked up.
pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_ascii_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail(value.trim().to_string()));
    }
    Ok(normalized)
}

/// Passwords are taken verbatim; only emptiness is rejected.
pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{normalize_content, normalize_email, normalize_name, ValidationError};

    #[test]
    fn names_are_trimmed_and_blank_rejected() {
        assert_eq!(normalize_name("  Groceries ").unwrap(), "Groceries");
        assert_eq!(normalize_name(" \t\n").unwrap_err(), ValidationError::EmptyName);
        assert_eq!(normalize_content("").unwrap_err(), ValidationError::EmptyContent);
    }

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(
            normalize_email(" Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "ada", "ada@", "@example.com", "ada@example", "a da@example.com"] {
            assert!(
                matches!(normalize_email(bad), Err(ValidationError::InvalidEmail(_))),
                "`{bad}` should be rejected"
            );
        }
    }
}
