// src/models/short_link.rs - Pure data structures
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validations::{parse_expiry, validate_alias, validate_url};

// DTO for POST /shorten
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequestDto {
    #[validate(custom(function = "validate_url"))]
    pub original_url: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "validate_alias"))]
    pub alias: Option<String>,

    #[serde(default, deserialize_with = "expiry_from_str")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// The front-end sends empty strings for fields the user left blank
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn expiry_from_str<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_expiry(&raw).map(Some).ok_or_else(|| {
            de::Error::custom(format!(
                "expiresAt '{}' is not a valid date-time (expected RFC 3339 or YYYY-MM-DDTHH:MM)",
                raw
            ))
        }),
    }
}

/// Represents a short link in the system
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    /// The unique code that identifies this link
    pub code: String,

    /// The original, long URL that was shortened
    pub original_url: String,

    /// When this link was created
    pub created_at: DateTime<Utc>,

    /// When this link expires (None means it never expires)
    pub expires_at: Option<DateTime<Utc>>,

    /// Number of successful redirects
    pub click_count: i64,

    /// Whether the code was a requested alias rather than generated
    pub is_custom_code: bool,
}

impl ShortLink {
    /// A link is expired once `now` reaches its expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => expiry <= now,
            None => false,
        }
    }
}

/// Everything the store needs to insert a link; the rest is assigned on insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortLink {
    pub code: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_custom_code: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponseDto {
    pub url: String,
}

// DTO for GET /info/{code}
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfoDto {
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
}

impl From<ShortLink> for LinkInfoDto {
    fn from(link: ShortLink) -> Self {
        LinkInfoDto {
            original_url: link.original_url,
            created_at: link.created_at,
            click_count: link.click_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;

    fn link(expires_at: Option<DateTime<Utc>>) -> ShortLink {
        ShortLink {
            code: "abc123".to_string(),
            original_url: "https://example.com".to_string(),
            created_at: Utc::now(),
            expires_at,
            click_count: 0,
            is_custom_code: false,
        }
    }

    #[test]
    fn test_request_accepts_front_end_payload() {
        let dto: ShortenRequestDto = serde_json::from_value(json!({
            "originalUrl": "https://example.com/a",
            "alias": "  docs ",
            "expiresAt": "2030-05-01T10:30",
        }))
        .unwrap();

        assert_eq!(dto.original_url, "https://example.com/a");
        assert_eq!(dto.alias.as_deref(), Some("docs"));
        assert_eq!(
            dto.expires_at,
            Some(Utc.with_ymd_and_hms(2030, 5, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_request_blank_fields_are_absent() {
        let dto: ShortenRequestDto = serde_json::from_value(json!({
            "originalUrl": "https://example.com",
            "alias": "",
            "expiresAt": "",
        }))
        .unwrap();
        assert!(dto.alias.is_none());
        assert!(dto.expires_at.is_none());

        let dto: ShortenRequestDto =
            serde_json::from_value(json!({ "originalUrl": "https://example.com" })).unwrap();
        assert!(dto.alias.is_none());
        assert!(dto.expires_at.is_none());
    }

    #[test]
    fn test_request_rejects_garbage_expiry() {
        let result = serde_json::from_value::<ShortenRequestDto>(json!({
            "originalUrl": "https://example.com",
            "expiresAt": "next tuesday",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        assert!(!link(None).is_expired_at(now));
        assert!(!link(Some(now + Duration::seconds(1))).is_expired_at(now));
        assert!(link(Some(now)).is_expired_at(now));
        assert!(link(Some(now - Duration::seconds(1))).is_expired_at(now));
    }

    #[test]
    fn test_info_dto_shape() {
        let value = serde_json::to_value(LinkInfoDto::from(link(None))).unwrap();
        assert!(value.get("originalUrl").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["clickCount"], 0);
    }
}
