//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
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

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.chars().count() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a movie title, returns the trimmed title
pub fn validate_title(title: &str) -> Result<String, String> {
    let title = title.trim();

    if title.is_empty() {
        return Err("Title is required".to_string());
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!(
            "Title must be at most {} characters long",
            MAX_TITLE_LEN
        ));
    }

    Ok(title.to_string())
}

/// Validate a movie description, returns the trimmed description
pub fn validate_description(description: Option<&str>) -> Result<String, String> {
    let description = description.unwrap_or_default().trim();

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "Description must be at most {} characters long",
            MAX_DESCRIPTION_LEN
        ));
    }

    Ok(description.to_string())
}
