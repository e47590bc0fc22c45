//! News sources feeding the aggregator

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::article::NewsArticle;
use crate::error::{NewsError, NewsResult};

pub mod curated;
pub mod dog_facts;
pub mod news_api;
pub mod reddit;

pub use curated::CuratedSource;
pub use dog_facts::DogFactsSource;
pub use news_api::NewsApiSource;
pub use reddit::RedditSource;

/// One independent origin of articles
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch and normalize this source's current articles
    async fn fetch(&self) -> NewsResult<Vec<NewsArticle>>;
}

/// Send a request and decode a JSON body, rejecting non-success statuses
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    source_name: &str,
) -> NewsResult<T> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(NewsError::Status {
            source_name: source_name.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.json::<T>().await?)
}
