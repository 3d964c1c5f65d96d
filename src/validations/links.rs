use std::borrow::Cow;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use url::Url;
use validator::{ValidationError, ValidationErrors};

pub const MAX_URL_LENGTH: usize = 2048;
pub const MIN_ALIAS_LENGTH: usize = 3;
pub const MAX_ALIAS_LENGTH: usize = 32;

/// Path segments owned by the API; an alias equal to one of them could never redirect
const RESERVED_ALIASES: &[&str] = &["shorten", "info", "analytics", "health"];

fn error_with_message(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates that a URL string is properly formatted and uses http/https
pub fn validate_url(url_str: &str) -> Result<(), ValidationError> {
    if url_str.len() > MAX_URL_LENGTH {
        return Err(error_with_message(
            "url_length",
            format!("URL must be at most {} characters", MAX_URL_LENGTH),
        ));
    }

    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(error_with_message(
                    "url_scheme",
                    "URL scheme must be http or https",
                ));
            }

            if url.host().is_none() {
                return Err(error_with_message("url_host", "URL must have a host"));
            }

            Ok(())
        }
        Err(_) => Err(error_with_message("url_format", "Invalid URL format")),
    }
}

/// Validates a requested alias:
/// - Between 3 and 32 characters
/// - Only ASCII letters, digits, hyphens and underscores
/// - Not a reserved route name
pub fn validate_alias(alias: &str) -> Result<(), ValidationError> {
    let len = alias.chars().count();
    if !(MIN_ALIAS_LENGTH..=MAX_ALIAS_LENGTH).contains(&len) {
        return Err(error_with_message(
            "alias_length",
            format!(
                "Alias must be between {} and {} characters",
                MIN_ALIAS_LENGTH, MAX_ALIAS_LENGTH
            ),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(error_with_message(
            "alias_charset",
            "Alias can only contain letters, digits, hyphens and underscores",
        ));
    }

    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(error_with_message(
            "alias_reserved",
            format!("Alias '{}' is reserved", alias),
        ));
    }

    Ok(())
}

/// Parses an expiry as RFC 3339, or as an HTML `datetime-local` value read as UTC
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Validates that an expiry lies in the future and within the allowed lifetime
pub fn validate_expiry(
    expires_at: &DateTime<Utc>,
    now: DateTime<Utc>,
    max_ttl: Duration,
) -> Result<(), ValidationError> {
    if *expires_at <= now {
        return Err(error_with_message(
            "expiry_past",
            "Expiration date must be in the future",
        ));
    }

    // A window past the calendar's end cannot be exceeded
    let too_far = now
        .checked_add_signed(max_ttl)
        .is_some_and(|latest| *expires_at > latest);
    if too_far {
        return Err(error_with_message(
            "expiry_too_far",
            format!(
                "Expiration date must be within {} days",
                max_ttl.num_days()
            ),
        ));
    }

    Ok(())
}

/// Flattens field errors into one sorted, human readable line
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons = errs
                .iter()
                .map(|e| {
                    e.message
                        .clone()
                        .unwrap_or_else(|| e.code.clone())
                        .into_owned()
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", field, reasons)
        })
        .collect::<Vec<_>>();
    parts.sort();
    parts.join("; ")
}
