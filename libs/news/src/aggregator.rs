//! Concurrent fan-out over every source with per-source failure isolation

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::article::{NewsArticle, sort_newest_first};
use crate::config::NewsConfig;
use crate::error::{NewsError, NewsResult};
use crate::sources::{CuratedSource, DogFactsSource, NewsApiSource, NewsSource, RedditSource};

/// Merges all configured sources into one feed
#[derive(Clone)]
pub struct NewsAggregator {
    sources: Vec<Arc<dyn NewsSource>>,
}

impl NewsAggregator {
    /// Build an aggregator over an explicit set of sources
    pub fn new(sources: Vec<Arc<dyn NewsSource>>) -> Self {
        Self { sources }
    }

    /// Build the standard four-source aggregator sharing one HTTP client
    pub fn from_config(config: &NewsConfig) -> NewsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| NewsError::Configuration(e.to_string()))?;

        Ok(Self::new(vec![
            Arc::new(CuratedSource),
            Arc::new(NewsApiSource::new(
                client.clone(),
                config.news_api_url.clone(),
                config.news_api_key.clone(),
            )),
            Arc::new(RedditSource::new(
                client.clone(),
                config.reddit_base_url.clone(),
            )),
            Arc::new(DogFactsSource::new(
                client,
                config.dog_facts_url.clone(),
                config.dog_image_url.clone(),
            )),
        ]))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Fetch every source concurrently and merge the results, newest first
    ///
    /// Waits for all sources to settle. A failing source is logged and
    /// contributes an empty list; this never returns an error.
    pub async fn fetch_all(&self) -> Vec<NewsArticle> {
        let fetches = self.sources.iter().map(|source| async move {
            (source.name(), source.fetch().await)
        });

        let mut articles = Vec::new();
        for (name, result) in join_all(fetches).await {
            match result {
                Ok(found) => {
                    info!("News source {} returned {} articles", name, found.len());
                    articles.extend(found);
                }
                Err(e) => warn!("News source {} failed: {}", name, e),
            }
        }

        sort_newest_first(&mut articles);
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct FixedSource(Vec<NewsArticle>);

    #[async_trait]
    impl NewsSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch(&self) -> NewsResult<Vec<NewsArticle>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl NewsSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self) -> NewsResult<Vec<NewsArticle>> {
            Err(NewsError::Status {
                source_name: "failing".to_string(),
                status: 503,
            })
        }
    }

    fn article(id: &str, day: u32) -> NewsArticle {
        NewsArticle {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            url: String::new(),
            image_url: String::new(),
            published_at: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
            source: "test".to_string(),
            category: Category::Entertainment,
            api_source: "test".to_string(),
            author: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_survivor_results_sorted_when_three_sources_fail() {
        let aggregator = NewsAggregator::new(vec![
            Arc::new(FailingSource),
            Arc::new(FixedSource(vec![
                article("old", 1),
                article("newest", 20),
                article("middle", 10),
            ])),
            Arc::new(FailingSource),
            Arc::new(FailingSource),
        ]);

        let feed = aggregator.fetch_all().await;
        let ids: Vec<_> = feed.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "middle", "old"]);
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty_feed() {
        let aggregator =
            NewsAggregator::new(vec![Arc::new(FailingSource), Arc::new(FailingSource)]);

        assert!(aggregator.fetch_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_sources_are_concatenated_without_dedup() {
        let aggregator = NewsAggregator::new(vec![
            Arc::new(FixedSource(vec![article("a", 3), article("dup", 5)])),
            Arc::new(FixedSource(vec![article("dup", 5), article("b", 4)])),
        ]);

        let feed = aggregator.fetch_all().await;
        assert_eq!(feed.len(), 4);
        assert_eq!(feed.iter().filter(|a| a.id == "dup").count(), 2);
        assert!(
            feed.windows(2)
                .all(|pair| pair[0].published_at >= pair[1].published_at)
        );
    }

    #[test]
    fn test_from_config_wires_four_sources() {
        let aggregator = NewsAggregator::from_config(&NewsConfig::default()).unwrap();
        assert_eq!(aggregator.source_count(), 4);
    }
}
