//! Profile repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::{
    models::user::{Role, UserProfile},
    session::{Identity, ProfileStore},
};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_profile(row: &PgRow) -> UserProfile {
        UserProfile {
            id: row.get("id"),
            display_name: row.get("display_name"),
            email: row.get("email"),
            role: Role::from_db(row.get::<&str, _>("role")),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    /// All profiles, newest first, optionally narrowed by an ILIKE pattern on name or email
    pub async fn list(&self, pattern: Option<&str>) -> Result<Vec<UserProfile>> {
        let rows = sqlx::query(
            r#"
            SELECT id, display_name, email, role, created_at, updated_at
            FROM users
            WHERE $1::text IS NULL OR display_name ILIKE $1 OR email ILIKE $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_profile).collect())
    }

    pub async fn set_role(&self, id: Uuid, role: Role) -> Result<Option<UserProfile>> {
        info!("Setting role of {} to {}", id, role.as_str());

        let row = sqlx::query(
            r#"
            UPDATE users SET role = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, display_name, email, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_profile))
    }
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role.as_deref().map(Role::from_db))
    }

    async fn create_if_absent(&self, identity: &Identity) -> Result<Role> {
        info!("Creating profile for {}", identity.user_id);

        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, email, role)
            VALUES ($1, $2, $3, 'user')
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(identity.user_id)
        .bind(&identity.display_name)
        .bind(&identity.email)
        .execute(&self.pool)
        .await?;

        // A concurrent request may have won the insert
        let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(identity.user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Role::from_db(&role))
    }
}
