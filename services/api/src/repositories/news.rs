//! Hidden-article overrides

use anyhow::Result;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct NewsRepository {
    pool: PgPool,
}

impl NewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn hidden_ids(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT article_id FROM api_news_management")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Hide or unhide one article id
    pub async fn set_hidden(
        &self,
        article_id: &str,
        hidden: bool,
        title: Option<&str>,
        admin_id: Uuid,
    ) -> Result<()> {
        info!("Setting article {} hidden={} by {}", article_id, hidden, admin_id);

        if hidden {
            sqlx::query(
                r#"
                INSERT INTO api_news_management (article_id, title, hidden_by)
                VALUES ($1, $2, $3)
                ON CONFLICT (article_id)
                DO UPDATE SET title = EXCLUDED.title, hidden_by = EXCLUDED.hidden_by, hidden_at = now()
                "#,
            )
            .bind(article_id)
            .bind(title)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query("DELETE FROM api_news_management WHERE article_id = $1")
                .bind(article_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }
}
