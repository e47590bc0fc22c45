//! Feed moderation views

use news::NewsArticle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Admin view of an article
#[derive(Debug, Clone, Serialize)]
pub struct ModeratedArticle {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub hidden: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisibilityUpdate {
    pub hidden: bool,
    /// Kept for the admin list; articles are transient
    #[serde(default)]
    pub title: Option<String>,
}

/// Public feed: hidden articles removed, order kept
pub fn visible(articles: Vec<NewsArticle>, hidden: &HashSet<String>) -> Vec<NewsArticle> {
    articles
        .into_iter()
        .filter(|article| !hidden.contains(&article.id))
        .collect()
}

pub fn moderated(articles: Vec<NewsArticle>, hidden: &HashSet<String>) -> Vec<ModeratedArticle> {
    articles
        .into_iter()
        .map(|article| ModeratedArticle {
            hidden: hidden.contains(&article.id),
            article,
        })
        .collect()
}
