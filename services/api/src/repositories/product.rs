//! Marketplace repository

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::product::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, name, description, price, contact, image_base64, stock, category, owner_id, active, created_at, updated_at";

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_product(row: &PgRow) -> Product {
        Product {
            id: row.get("id"),
            name: row.get("name"),
            description: row.get("description"),
            price: row.get("price"),
            contact: row.get("contact"),
            image_base64: row.get("image_base64"),
            stock: row.get("stock"),
            category: row.get("category"),
            owner_id: row.get("owner_id"),
            active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    /// Storefront: active products, optionally one category, newest first
    pub async fn list_active(&self, category: Option<&str>) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM produtos_loja
            WHERE active AND ($1::text IS NULL OR category = $1)
            ORDER BY created_at DESC
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_product).collect())
    }

    /// Seller view, inactive included
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM produtos_loja WHERE owner_id = $1 ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_product).collect())
    }

    pub async fn list_all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM produtos_loja ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::map_product).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM produtos_loja WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_product))
    }

    /// Expects a validated product; price already normalised
    pub async fn create(&self, owner_id: Uuid, product: &NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO produtos_loja
                (name, description, price, contact, image_base64, stock, category, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.price)
        .bind(&product.contact)
        .bind(&product.image_base64)
        .bind(product.stock)
        .bind(&product.category)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::map_product(&row))
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE produtos_loja SET active = NOT active, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_product))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM produtos_loja WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
