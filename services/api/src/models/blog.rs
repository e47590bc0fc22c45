//! Community blog posts, authored by admins

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::required;

#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub author: String,
    pub category: String,
    pub icon: String,
    pub read_time: String,
    pub published_at: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogPostPayload {
    pub title: String,
    pub description: String,
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Validated post fields ready to be written
#[derive(Debug, Clone)]
pub struct BlogPostInput {
    pub title: String,
    pub description: String,
    pub author: String,
    pub category: String,
    pub icon: String,
    pub read_time: String,
    pub published_at: DateTime<Utc>,
    pub active: bool,
}

impl BlogPostPayload {
    pub fn validate(self, now: DateTime<Utc>) -> Result<BlogPostInput, String> {
        Ok(BlogPostInput {
            title: required(&self.title, "Title")?,
            description: required(&self.description, "Description")?,
            author: required(&self.author, "Author")?,
            category: required(&self.category, "Category")?,
            icon: self
                .icon
                .map(|i| i.trim().to_string())
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| "📄".to_string()),
            read_time: self
                .read_time
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "5 min".to_string()),
            published_at: self.published_at.unwrap_or(now),
            active: self.active.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_filled() {
        let now = Utc::now();
        let input = BlogPostPayload {
            title: "Vacinas".to_string(),
            description: "Calendário anual".to_string(),
            author: "Equipe PetLoc".to_string(),
            category: "Saúde".to_string(),
            icon: None,
            read_time: Some(" ".to_string()),
            published_at: None,
            active: None,
        }
        .validate(now)
        .unwrap();

        assert_eq!(input.icon, "📄");
        assert_eq!(input.read_time, "5 min");
        assert_eq!(input.published_at, now);
        assert!(input.active);
    }
}
