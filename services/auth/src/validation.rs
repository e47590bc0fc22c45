//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::RegisterRequest;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate display name
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let name = name.trim();

    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() > 80 {
        return Err("Name must be at most 80 characters long".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password and its confirmation
pub fn validate_password(password: &str, confirmation: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    if password != confirmation {
        return Err("Passwords do not match".to_string());
    }

    Ok(())
}

/// Validate a full registration request, first failure wins
pub fn validate_registration(request: &RegisterRequest) -> Result<(), String> {
    validate_display_name(&request.display_name)?;
    validate_email(request.email.trim())?;
    validate_password(&request.password, &request.password_confirmation)
}
