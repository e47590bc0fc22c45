//! Redis access for short-lived auth state
//!
//! Refresh-token sessions and the token blacklist live here. Every key is
//! written under a configurable namespace so several deployments can share
//! one Redis instance.

use anyhow::Result;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_KEY_PREFIX: &str = "petloc:";

/// Redis connection settings
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://localhost:6379`
    pub url: String,
    pub max_connections: u32,
    /// Prepended to every key
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            max_connections: 10,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl RedisConfig {
    /// # Environment Variables
    /// - `REDIS_URL`: connection URL (default: "redis://localhost:6379")
    /// - `REDIS_MAX_CONNECTIONS`: connection cap (default: 10)
    /// - `REDIS_KEY_PREFIX`: key namespace (default: "petloc:")
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let url = std::env::var("REDIS_URL").unwrap_or(defaults.url);
        if url.trim().is_empty() {
            anyhow::bail!("REDIS_URL must not be empty");
        }

        Ok(Self {
            url,
            max_connections: std::env::var("REDIS_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        })
    }
}

/// Cheaply cloneable handle over one multiplexed client
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
    key_prefix: String,
}

impl RedisPool {
    /// Validates the URL; no connection is opened until the first command
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!(
            "Redis client ready for {} (namespace {:?})",
            config.url, config.key_prefix
        );

        Ok(Self {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Store a value, expiring after `ttl_seconds` when given
    ///
    /// A zero TTL stores nothing.
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<()> {
        let key = self.key(key);
        let mut conn = self.connection().await?;

        match ttl_seconds {
            Some(0) => debug!("Skipping write of {} with zero TTL", key),
            Some(ttl) => conn.set_ex::<_, _, ()>(&key, value, ttl).await?,
            None => conn.set::<_, _, ()>(&key, value).await?,
        }

        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.get(self.key(key)).await?)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        Ok(conn.exists(self.key(key)).await?)
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, u64>(self.key(key)).await?;
        Ok(())
    }

    /// PING round trip
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}
