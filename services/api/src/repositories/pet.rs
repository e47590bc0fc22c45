//! Pet repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::pet::{Pet, PetPayload};

const PET_COLUMNS: &str =
    "id, name, description, contact, image_base64, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct PetRepository {
    pool: PgPool,
}

impl PetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_pet(row: &PgRow) -> Pet {
        Pet {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            contact: row.get("contact"),
            image_base64: row.get("image_base64"),
            owner_id: row.get("owner_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    /// Exactly the owner's pets, newest first
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Pet>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pets WHERE owner_id = $1 ORDER BY created_at DESC",
            PET_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_pet).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Pet>> {
        let row = sqlx::query(&format!("SELECT {} FROM pets WHERE id = $1", PET_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::map_pet))
    }

    pub async fn create(&self, owner_id: Uuid, payload: &PetPayload) -> Result<Pet> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO pets (name, description, contact, image_base64, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PET_COLUMNS
        ))
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.contact)
        .bind(&payload.image_base64)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::map_pet(&row))
    }

    pub async fn update(&self, id: Uuid, payload: &PetPayload) -> Result<Option<Pet>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE pets
            SET name = $2, description = $3, contact = $4, image_base64 = $5, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            PET_COLUMNS
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.contact)
        .bind(&payload.image_base64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_pet))
    }

    /// Returns false when nothing was deleted
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
