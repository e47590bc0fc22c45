//! Missing-pet report repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{
    missing::{MissingFilter, MissingReport},
    pet::PetPayload,
};

const REPORT_COLUMNS: &str = "d.id, d.name, d.description, d.contact, d.image_base64, d.owner_id, d.found, d.created_at, d.updated_at";

#[derive(Clone)]
pub struct MissingRepository {
    pool: PgPool,
}

impl MissingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_report(row: &PgRow, with_email: bool) -> MissingReport {
        MissingReport {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            contact: row.get("contact"),
            image_base64: row.get("image_base64"),
            owner_id: row.get("owner_id"),
            found: row.get("found"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            owner_email: if with_email {
                row.get("owner_email")
            } else {
                None
            },
        }
    }

    /// Board listing, newest first
    pub async fn list(&self, filter: MissingFilter) -> Result<Vec<MissingReport>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM desaparecidos d
            WHERE $1::boolean IS NULL OR d.found = $1
            ORDER BY d.created_at DESC
            "#,
            REPORT_COLUMNS
        ))
        .bind(filter.found())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| Self::map_report(row, false)).collect())
    }

    /// Admin listing joined with the reporter's email
    pub async fn list_with_owner_email(&self) -> Result<Vec<MissingReport>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}, u.email AS owner_email
            FROM desaparecidos d
            LEFT JOIN users u ON u.id = d.owner_id
            ORDER BY d.created_at DESC
            "#,
            REPORT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| Self::map_report(row, true)).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MissingReport>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM desaparecidos d WHERE d.id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| Self::map_report(row, false)))
    }

    pub async fn create(&self, owner_id: Uuid, payload: &PetPayload) -> Result<MissingReport> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO desaparecidos AS d (name, description, contact, image_base64, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.contact)
        .bind(&payload.image_base64)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::map_report(&row, false))
    }

    /// Set found = true; repeating it is harmless
    pub async fn mark_found(&self, id: Uuid) -> Result<Option<MissingReport>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE desaparecidos AS d SET found = TRUE, updated_at = now()
            WHERE d.id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| Self::map_report(row, false)))
    }

    /// Flip found in either direction (admin only)
    pub async fn toggle_found(&self, id: Uuid) -> Result<Option<MissingReport>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE desaparecidos AS d SET found = NOT d.found, updated_at = now()
            WHERE d.id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| Self::map_report(row, false)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM desaparecidos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
