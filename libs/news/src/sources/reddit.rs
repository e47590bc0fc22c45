//! Hot posts from a fixed set of pet forums on Reddit

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use super::{NewsSource, get_json};
use crate::article::{NewsArticle, or_placeholder};
use crate::category::categorize;
use crate::error::NewsResult;

const SUBREDDITS: &[&str] = &["pets", "dogs", "cats", "dogtraining", "PetAdvice"];
const POSTS_PER_FORUM: &str = "10";

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingChild {
    pub data: Post,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Post {
    pub id: String,
    pub title: Option<String>,
    pub selftext: Option<String>,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    pub subreddit: Option<String>,
    pub author: Option<String>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub preview: Option<Preview>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Preview {
    #[serde(default)]
    pub images: Vec<PreviewImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewImage {
    pub source: PreviewSource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewSource {
    pub url: String,
}

/// Reddit listing source
#[derive(Debug, Clone)]
pub struct RedditSource {
    client: reqwest::Client,
    base_url: String,
}

impl RedditSource {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn hot_posts(&self, subreddit: &str) -> NewsResult<Vec<NewsArticle>> {
        let url = format!(
            "{}/r/{}/hot.json",
            self.base_url.trim_end_matches('/'),
            subreddit
        );
        let request = self.client.get(url).query(&[("limit", POSTS_PER_FORUM)]);

        let listing: Listing = get_json(request, self.name()).await?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| normalize(child.data))
            .collect())
    }
}

/// Pick the best image for a post: thumbnail, then preview, then a direct image link
pub(crate) fn post_image(post: &Post) -> String {
    if let Some(thumbnail) = &post.thumbnail {
        if thumbnail.starts_with("http") && thumbnail != "self" && thumbnail != "default" {
            return thumbnail.clone();
        }
    }

    if let Some(image) = post.preview.as_ref().and_then(|p| p.images.first()) {
        return image.source.url.replace("&amp;", "&");
    }

    if let Some(url) = &post.url {
        if [".jpg", ".png", ".jpeg"].iter().any(|ext| url.ends_with(ext)) {
            return url.clone();
        }
    }

    String::new()
}

pub(crate) fn normalize(post: Post) -> NewsArticle {
    let image_url = post_image(&post);
    let title = or_placeholder(post.title, "Sem título");
    let published_at = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0)
        .unwrap_or_else(Utc::now);

    NewsArticle {
        id: format!("reddit-{}", post.id),
        category: categorize(&title),
        title,
        description: or_placeholder(
            post.selftext,
            "Clique para ver mais detalhes no Reddit",
        ),
        url: format!("https://reddit.com{}", post.permalink),
        image_url,
        published_at,
        source: format!(
            "Reddit - r/{}",
            post.subreddit.as_deref().unwrap_or("unknown")
        ),
        api_source: "Reddit".to_string(),
        author: format!("u/{}", post.author.as_deref().unwrap_or("unknown")),
    }
}

#[async_trait]
impl NewsSource for RedditSource {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn fetch(&self) -> NewsResult<Vec<NewsArticle>> {
        let mut articles = Vec::new();

        for subreddit in SUBREDDITS {
            match self.hot_posts(subreddit).await {
                Ok(posts) => articles.extend(posts),
                Err(e) => warn!("Reddit forum r/{} failed: {}", subreddit, e),
            }
        }

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post() -> Post {
        Post {
            id: "abc".to_string(),
            title: Some("Rescue pup found a home".to_string()),
            permalink: "/r/dogs/comments/abc/rescue/".to_string(),
            created_utc: 1_700_000_000.0,
            subreddit: Some("dogs".to_string()),
            author: Some("walker".to_string()),
            ..Post::default()
        }
    }

    #[test]
    fn test_thumbnail_preferred_when_http() {
        let mut p = post();
        p.thumbnail = Some("https://thumbs.example/t.jpg".to_string());
        p.url = Some("https://i.example/full.png".to_string());

        assert_eq!(post_image(&p), "https://thumbs.example/t.jpg");
    }

    #[test]
    fn test_preview_used_and_unescaped() {
        let mut p = post();
        p.thumbnail = Some("self".to_string());
        p.preview = Some(Preview {
            images: vec![PreviewImage {
                source: PreviewSource {
                    url: "https://preview.example/i.jpg?width=640&amp;s=xyz".to_string(),
                },
            }],
        });

        assert_eq!(post_image(&p), "https://preview.example/i.jpg?width=640&s=xyz");
    }

    #[test]
    fn test_direct_image_link_then_empty() {
        let mut p = post();
        p.thumbnail = Some("default".to_string());
        p.url = Some("https://i.example/photo.jpeg".to_string());
        assert_eq!(post_image(&p), "https://i.example/photo.jpeg");

        p.url = Some("https://example.com/article".to_string());
        assert_eq!(post_image(&p), "");
    }

    #[test]
    fn test_normalize_post() {
        let article = normalize(post());

        assert_eq!(article.id, "reddit-abc");
        assert_eq!(article.url, "https://reddit.com/r/dogs/comments/abc/rescue/");
        assert_eq!(article.source, "Reddit - r/dogs");
        assert_eq!(article.author, "u/walker");
        assert_eq!(
            article.description,
            "Clique para ver mais detalhes no Reddit"
        );
        assert_eq!(
            article.published_at,
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        );
        assert_eq!(article.category, crate::Category::Adoption);
    }

    #[test]
    fn test_decodes_listing() {
        let payload = r#"{"kind":"Listing","data":{"children":[
            {"kind":"t3","data":{"id":"q1","title":"Vet visit tips","permalink":"/r/pets/q1/","created_utc":1700000100.0,"subreddit":"pets","author":"a","thumbnail":"self"}}
        ]}}"#;

        let listing: Listing = serde_json::from_str(payload).unwrap();
        assert_eq!(listing.data.children.len(), 1);

        let article = normalize(listing.data.children.into_iter().next().unwrap().data);
        assert_eq!(article.category, crate::Category::Health);
        assert_eq!(article.image_url, "");
    }
}
