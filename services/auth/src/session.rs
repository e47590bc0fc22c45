//! Refresh-token sessions kept in Redis
//!
//! One live session per account: logging in on a second device replaces the
//! stored refresh token, so only the newest one can be rotated.

use anyhow::Result;
use common::cache::RedisPool;
use tracing::info;
use uuid::Uuid;

fn session_key(account_id: Uuid) -> String {
    format!("session:{}", account_id)
}

/// Session manager for handling account sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

impl SessionManager {
    pub fn new(redis_pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            redis_pool,
            ttl_seconds,
        }
    }

    /// Store (or replace) the session for an account
    pub async fn store(&self, account_id: Uuid, refresh_token: &str) -> Result<()> {
        info!("Storing session for account: {}", account_id);

        self.redis_pool
            .set(
                &session_key(account_id),
                refresh_token,
                Some(self.ttl_seconds),
            )
            .await
    }

    /// Delete the session for an account
    pub async fn delete(&self, account_id: Uuid) -> Result<()> {
        info!("Deleting session for account: {}", account_id);
        self.redis_pool.delete(&session_key(account_id)).await
    }

    /// Check that the presented refresh token is the one currently stored
    pub async fn is_current(&self, account_id: Uuid, refresh_token: &str) -> Result<bool> {
        let stored = self.redis_pool.get(&session_key(account_id)).await?;
        Ok(stored.as_deref() == Some(refresh_token))
    }

    pub async fn health_check(&self) -> Result<bool> {
        self.redis_pool.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::cache::RedisConfig;

    #[test]
    fn test_session_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            session_key(id),
            "session:00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_store_replace_and_delete() {
        let pool = RedisPool::new(&RedisConfig::from_env().unwrap())
            .await
            .unwrap();
        let sessions = SessionManager::new(pool, 60);
        let id = Uuid::new_v4();

        sessions.store(id, "first").await.unwrap();
        sessions.store(id, "second").await.unwrap();
        assert!(!sessions.is_current(id, "first").await.unwrap());
        assert!(sessions.is_current(id, "second").await.unwrap());

        sessions.delete(id).await.unwrap();
        assert!(!sessions.is_current(id, "second").await.unwrap());
    }
}
