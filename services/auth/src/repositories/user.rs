//! Account repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Account, NewAccount, Role};

const ACCOUNT_COLUMNS: &str = r#"
    a.id, a.email, a.password_hash, a.created_at,
    COALESCE(u.display_name, split_part(a.email, '@', 1)) AS display_name
"#;

/// Account and profile repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_account(row: &PgRow) -> Account {
        Account {
            id: row.get("id"),
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }
    }

    /// Create an account and its `user` profile in one transaction
    pub async fn create(&self, new_account: &NewAccount) -> Result<Account> {
        info!("Creating new account: {}", new_account.email);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let password_hash = Argon2::default()
            .hash_password(new_account.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO accounts (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, created_at
            "#,
        )
        .bind(&new_account.email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let id: Uuid = row.get("id");

        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, email, role)
            VALUES ($1, $2, $3, 'user')
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&new_account.display_name)
        .bind(&new_account.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Account {
            id,
            email: new_account.email.clone(),
            display_name: new_account.display_name.clone(),
            password_hash,
            created_at: row.get("created_at"),
        })
    }

    /// Check whether an email is already registered, ignoring case
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Find an account by email, ignoring case
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        info!("Finding account by email: {}", email);

        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts a LEFT JOIN users u ON u.id = a.id WHERE lower(a.email) = lower($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_account))
    }

    /// Find an account by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts a LEFT JOIN users u ON u.id = a.id WHERE a.id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_account))
    }

    /// Verify an account's password
    pub fn verify_password(&self, account: &Account, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Return the profile role, creating a `user` profile when none exists
    pub async fn ensure_profile(&self, account: &Account) -> Result<Role> {
        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, email, role)
            VALUES ($1, $2, $3, 'user')
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(account.id)
        .bind(&account.display_name)
        .bind(&account.email)
        .execute(&self.pool)
        .await?;

        let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(account.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Role::from_db(&role))
    }
}
