//! API models for request and response payloads

pub mod blog;
pub mod chat;
pub mod missing;
pub mod news;
pub mod pet;
pub mod product;
pub mod user;

/// Trimmed value of a required text field
pub(crate) fn required(value: &str, field: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(value.to_string())
}

/// Empty strings count as absent
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
