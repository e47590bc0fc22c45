//! Keyword search against NewsAPI's `everything` endpoint

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use super::{NewsSource, get_json};
use crate::article::{NewsArticle, or_placeholder, parse_timestamp};
use crate::category::categorize;
use crate::error::NewsResult;

const QUERIES: &[&str] = &[
    "pets OR animais OR saúde animal",
    "cachorro OR gato OR veterinário",
    "adoção animal OR resgate animais",
];

const PAGE_SIZE: &str = "5";

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<ApiOutlet>,
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiOutlet {
    pub name: Option<String>,
}

/// Searches three Portuguese pet-related queries
///
/// Without an API key the source yields nothing and sends no request.
#[derive(Debug, Clone)]
pub struct NewsApiSource {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl NewsApiSource {
    pub fn new(client: reqwest::Client, url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }

    async fn search(&self, api_key: &str, query: &str) -> NewsResult<Vec<NewsArticle>> {
        let request = self.client.get(&self.url).query(&[
            ("q", query),
            ("language", "pt"),
            ("pageSize", PAGE_SIZE),
            ("sortBy", "publishedAt"),
            ("apiKey", api_key),
        ]);

        let response: SearchResponse = get_json(request, self.name()).await?;
        let now = Utc::now();

        Ok(response
            .articles
            .into_iter()
            .map(|article| normalize(article, now))
            .collect())
    }
}

pub(crate) fn normalize(article: ApiArticle, now: DateTime<Utc>) -> NewsArticle {
    let url = article.url.unwrap_or_default();
    let title = or_placeholder(article.title, "Sem título");

    NewsArticle {
        id: format!("newsapi-{}", url),
        category: categorize(&title),
        title,
        description: or_placeholder(article.description, "Sem descrição"),
        url,
        image_url: article.url_to_image.unwrap_or_default(),
        published_at: parse_timestamp(article.published_at.as_deref(), now),
        source: or_placeholder(
            article.source.and_then(|s| s.name),
            "Fonte desconhecida",
        ),
        api_source: "NewsAPI".to_string(),
        author: or_placeholder(article.author, "Autor desconhecido"),
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &'static str {
        "newsapi"
    }

    async fn fetch(&self) -> NewsResult<Vec<NewsArticle>> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("NEWS_API_KEY is not configured; skipping NewsAPI");
            return Ok(Vec::new());
        };

        let mut articles = Vec::new();

        // Each query stands alone: a failed one is skipped
        for query in QUERIES {
            match self.search(api_key, query).await {
                Ok(found) => articles.extend(found),
                Err(e) => warn!("NewsAPI query '{}' failed: {}", query, e),
            }
        }

        Ok(articles)
    }
}
