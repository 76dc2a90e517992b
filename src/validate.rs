use regex::Regex;
use std::sync::OnceLock;

use crate::errors::{AppError, AppResult};

/// Permissive email shape check used by both site forms: something, an `@`,
/// something, a dot, something. Deliberately not RFC-complete.
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

pub struct FieldValidator;

impl FieldValidator {
    /// A required field must be non-empty after trimming whitespace.
    pub fn require(field: &str, value: &str, message: &str) -> AppResult<()> {
        if value.trim().is_empty() {
            return Err(AppError::validation(field, message));
        }
        Ok(())
    }

    pub fn validate_email(field: &str, value: &str, message: &str) -> AppResult<()> {
        if value.trim().is_empty() || !email_regex().is_match(value) {
            return Err(AppError::validation(field, message));
        }
        Ok(())
    }
}
