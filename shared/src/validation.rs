//! Input validation helpers shared by the console handlers

use crate::error::{AppError, AppResult};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_NOTE_LEN: usize = 500;
pub const MAX_SHORT_TEXT_LEN: usize = 50;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trimmed value must be non-empty and at most `max_len` characters
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")).with_detail("field", field));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_len} characters"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_len} characters"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Finite and >= 0
pub fn validate_non_negative(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number"))
            .with_detail("field", field));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!("{field} must not be negative"))
            .with_detail("field", field));
    }
    Ok(())
}

/// Percentage in 0..=100
pub fn validate_percentage(value: f64, field: &str) -> AppResult<()> {
    validate_non_negative(value, field)?;
    if value > 100.0 {
        return Err(AppError::validation(format!("{field} must be at most 100"))
            .with_detail("field", field));
    }
    Ok(())
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(value: &str, field: &str) -> AppResult<()> {
    let invalid = || {
        AppError::validation(format!("{field} is not a valid email address")).with_detail("field", field)
    };
    let (local, domain) = value.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(value: &str) -> AppResult<()> {
    let len = value.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password"));
    }
    Ok(())
}
