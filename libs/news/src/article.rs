//! Normalized article shape shared by every source

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A news item produced fresh on each aggregation; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Source-provided identifier, prefixed with the source tag
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub published_at: DateTime<Utc>,
    /// Human-readable outlet name
    pub source: String,
    pub category: Category,
    /// Which aggregator source produced the item
    pub api_source: String,
    pub author: String,
}

/// Order articles newest first
pub fn sort_newest_first(articles: &mut [NewsArticle]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Parse an RFC 3339 timestamp, falling back to `fallback` when absent or malformed
pub(crate) fn parse_timestamp(value: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback)
}

/// Use `value` unless it is missing or blank
pub(crate) fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_falls_back() {
        let fallback = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let parsed = parse_timestamp(Some("2024-05-02T10:30:00Z"), fallback);
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 2, 10, 30, 0).unwrap());

        assert_eq!(parse_timestamp(Some("yesterday"), fallback), fallback);
        assert_eq!(parse_timestamp(None, fallback), fallback);
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(Some("Title".into()), "x"), "Title");
        assert_eq!(or_placeholder(Some("   ".into()), "x"), "x");
        assert_eq!(or_placeholder(None, "x"), "x");
    }
}
