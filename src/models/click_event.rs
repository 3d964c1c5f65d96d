// src/models/click_event.rs - Click events and the analytics derived from them
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One successful redirect through a short link
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    /// Store-assigned, increases with every append
    pub id: i64,
    pub code: String,
    pub timestamp: DateTime<Utc>,
    pub source_ip: String,
}

/// A click that has not been appended yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewClickEvent {
    pub code: String,
    pub timestamp: DateTime<Utc>,
    pub source_ip: String,
}

/// Counter and source addresses read from a single consistent snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickSummary {
    pub click_count: i64,
    /// Most recent first
    pub source_ips: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub limit: Option<usize>,
}

// DTO for GET /analytics/{code}
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDto {
    pub click_count: i64,
    pub ip_addresses: Vec<String>,
}

impl From<ClickSummary> for AnalyticsDto {
    fn from(summary: ClickSummary) -> Self {
        AnalyticsDto {
            click_count: summary.click_count,
            ip_addresses: summary.source_ips,
        }
    }
}
