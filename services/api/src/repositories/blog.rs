//! Blog repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::blog::{BlogPost, BlogPostInput};

const POST_COLUMNS: &str = "id, title, description, author, category, icon, read_time, published_at, active, created_at, updated_at";

#[derive(Clone)]
pub struct BlogRepository {
    pool: PgPool,
}

impl BlogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_post(row: &PgRow) -> BlogPost {
        BlogPost {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            author: row.get("author"),
            category: row.get("category"),
            icon: row.get("icon"),
            read_time: row.get("read_time"),
            published_at: row.get("published_at"),
            active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    /// Newest publication first; inactive posts only when asked for
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<BlogPost>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM blog_posts WHERE active OR $1 ORDER BY published_at DESC",
            POST_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_post).collect())
    }

    pub async fn create(&self, post: &BlogPostInput) -> Result<BlogPost> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO blog_posts
                (title, description, author, category, icon, read_time, published_at, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.author)
        .bind(&post.category)
        .bind(&post.icon)
        .bind(&post.read_time)
        .bind(post.published_at)
        .bind(post.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::map_post(&row))
    }

    pub async fn update(&self, id: Uuid, post: &BlogPostInput) -> Result<Option<BlogPost>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE blog_posts
            SET title = $2, description = $3, author = $4, category = $5, icon = $6,
                read_time = $7, published_at = $8, active = $9, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.author)
        .bind(&post.category)
        .bind(&post.icon)
        .bind(&post.read_time)
        .bind(post.published_at)
        .bind(post.active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_post))
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<BlogPost>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE blog_posts SET active = NOT active, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_post))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
