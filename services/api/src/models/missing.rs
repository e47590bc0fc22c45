//! Lost-and-found board

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct MissingReport {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub contact: String,
    pub image_base64: Option<String>,
    pub owner_id: Uuid,
    pub found: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Only filled on the admin listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

/// Board filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFilter {
    #[default]
    All,
    Missing,
    Found,
}

impl MissingFilter {
    /// Value the `found` column must have, None for no restriction
    pub fn found(&self) -> Option<bool> {
        match self {
            MissingFilter::All => None,
            MissingFilter::Missing => Some(false),
            MissingFilter::Found => Some(true),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MissingQuery {
    #[serde(default)]
    pub filter: MissingFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_mapping() {
        let query: MissingQuery = serde_json::from_str(r#"{"filter":"found"}"#).unwrap();
        assert_eq!(query.filter.found(), Some(true));
        assert_eq!(MissingFilter::Missing.found(), Some(false));
        assert_eq!(MissingQuery::default().filter.found(), None);
    }
}
