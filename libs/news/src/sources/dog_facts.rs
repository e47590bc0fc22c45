//! Dog trivia with a companion image

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use super::{NewsSource, get_json};
use crate::article::NewsArticle;
use crate::category::Category;
use crate::error::NewsResult;

const FACT_COUNT: &str = "2";

#[derive(Debug, Deserialize)]
pub(crate) struct FactsResponse {
    #[serde(default)]
    pub facts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DogImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DogFactsSource {
    client: reqwest::Client,
    facts_url: String,
    image_url: String,
}

impl DogFactsSource {
    pub fn new(client: reqwest::Client, facts_url: String, image_url: String) -> Self {
        Self {
            client,
            facts_url,
            image_url,
        }
    }

    /// The image is decoration only; any failure leaves it blank
    async fn companion_image(&self) -> String {
        let request = self.client.get(&self.image_url).query(&[("limit", "1")]);

        match get_json::<Vec<DogImage>>(request, self.name()).await {
            Ok(images) => images
                .into_iter()
                .next()
                .and_then(|image| image.url)
                .unwrap_or_default(),
            Err(e) => {
                warn!("Dog image lookup failed: {}", e);
                String::new()
            }
        }
    }
}

pub(crate) fn to_articles(
    facts: Vec<String>,
    image_url: &str,
    now: DateTime<Utc>,
) -> Vec<NewsArticle> {
    facts
        .into_iter()
        .enumerate()
        .map(|(index, fact)| NewsArticle {
            id: format!("dogapi-{}", index),
            title: "Curiosidade Canina 🐕".to_string(),
            description: fact,
            url: "https://thedogapi.com".to_string(),
            image_url: image_url.to_string(),
            published_at: now,
            source: "The Dog API".to_string(),
            category: Category::Entertainment,
            api_source: "DogAPI".to_string(),
            author: "The Dog API".to_string(),
        })
        .collect()
}

#[async_trait]
impl NewsSource for DogFactsSource {
    fn name(&self) -> &'static str {
        "dog-facts"
    }

    async fn fetch(&self) -> NewsResult<Vec<NewsArticle>> {
        let request = self
            .client
            .get(&self.facts_url)
            .query(&[("number", FACT_COUNT)]);
        let response: FactsResponse = get_json(request, self.name()).await?;

        if response.facts.is_empty() {
            return Ok(Vec::new());
        }

        let image_url = self.companion_image().await;
        Ok(to_articles(response.facts, &image_url, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facts_become_entertainment_articles() {
        let now = Utc::now();
        let articles = to_articles(
            vec!["Dogs have three eyelids.".to_string(), "Puppies are born deaf.".to_string()],
            "https://cdn.example/dog.jpg",
            now,
        );

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].id, "dogapi-1");
        assert_eq!(articles[0].description, "Dogs have three eyelids.");
        assert!(articles.iter().all(|a| a.category == Category::Entertainment));
        assert!(articles.iter().all(|a| a.image_url == "https://cdn.example/dog.jpg"));
    }

    #[test]
    fn test_decodes_payloads() {
        let facts: FactsResponse =
            serde_json::from_str(r#"{"facts":["a","b"],"success":true}"#).unwrap();
        assert_eq!(facts.facts, vec!["a", "b"]);

        let images: Vec<DogImage> =
            serde_json::from_str(r#"[{"id":"x","url":"https://cdn/x.jpg","width":1}]"#).unwrap();
        assert_eq!(images[0].url.as_deref(), Some("https://cdn/x.jpg"));
    }
}
