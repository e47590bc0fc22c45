//! News aggregator configuration loaded from environment variables

use std::env;
use std::time::Duration;

/// Value shipped in sample env files; treated the same as no key.
const PLACEHOLDER_API_KEY: &str = "SUA_CHAVE_NEWSAPI_AQUI";

/// Endpoints and credentials for the news sources
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// NewsAPI key. `None` disables that source.
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub reddit_base_url: String,
    pub dog_facts_url: String,
    pub dog_image_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            news_api_url: "https://newsapi.org/v2/everything".to_string(),
            reddit_base_url: "https://www.reddit.com".to_string(),
            dog_facts_url: "https://dog-api.kinduff.com/api/facts".to_string(),
            dog_image_url: "https://api.thedogapi.com/v1/images/search".to_string(),
            request_timeout_secs: 10,
            user_agent: concat!("petloc-news/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NewsConfig {
    /// Create a new NewsConfig from environment variables
    ///
    /// # Environment Variables
    /// - `NEWS_API_KEY`: NewsAPI key (optional)
    /// - `NEWS_API_URL`, `REDDIT_BASE_URL`, `DOG_FACTS_URL`, `DOG_IMAGE_URL`: endpoint overrides
    /// - `NEWS_REQUEST_TIMEOUT_SECS`: per-request timeout (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let news_api_key = env::var("NEWS_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY);

        let request_timeout_secs = env::var("NEWS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        Self {
            news_api_key,
            news_api_url: env::var("NEWS_API_URL").unwrap_or(defaults.news_api_url),
            reddit_base_url: env::var("REDDIT_BASE_URL").unwrap_or(defaults.reddit_base_url),
            dog_facts_url: env::var("DOG_FACTS_URL").unwrap_or(defaults.dog_facts_url),
            dog_image_url: env::var("DOG_IMAGE_URL").unwrap_or(defaults.dog_image_url),
            request_timeout_secs,
            user_agent: defaults.user_agent,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
