//! Field validators. Each returns the cleaned value or a user-facing message.

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Accepted `pub_date` layouts; the first is what a datetime-local input sends.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Format used when prefilling a datetime-local input.
pub const DATETIME_LOCAL: &str = "%Y-%m-%dT%H:%M";

pub fn required(value: &str) -> Result<&str, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(REQUIRED.to_string())
    } else {
        Ok(value)
    }
}

pub fn max_length(value: &str, max: usize) -> Result<&str, String> {
    let len = value.chars().count();
    if len > max {
        Err(format!(
            "Ensure this value has at most {max} characters (it has {len})."
        ))
    } else {
        Ok(value)
    }
}

/// Required date-time, read as UTC.
pub fn datetime(value: &str) -> Result<DateTime<Utc>, String> {
    let value = required(value)?;
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| "Enter a valid date/time.".to_string())
}

/// Blank means "none"; anything else must be an ID.
pub fn optional_id(value: &str) -> Result<Option<Uuid>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| INVALID_CHOICE.to_string())
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain.
pub fn email(value: &str) -> Result<&str, String> {
    let invalid = || "Enter a valid email address.".to_string();
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    let domain_ok = domain
        .split('.')
        .all(|label| !label.is_empty() && !label.contains(char::is_whitespace))
        && domain.contains('.');
    if local.is_empty() || local.contains(char::is_whitespace) || domain.contains('@') || !domain_ok
    {
        return Err(invalid());
    }
    Ok(value)
}

/// Letters, digits and `@ . + - _`.
pub fn username(value: &str) -> Result<&str, String> {
    let value = required(value)?;
    let value = max_length(value, 150)?;
    if value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        Ok(value)
    } else {
        Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        )
    }
}
