//! JWT service for token generation, validation, and management
//!
//! Tokens are signed with RS256. Access tokens carry the account's email,
//! display name and resolved role; the API service re-resolves the role from
//! the database on every request, so the `roles` claim is informational.
//! Refresh tokens are rotated on use and blacklisted in Redis.

use anyhow::Result;
use common::cache::RedisPool;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::{Account, Role};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

/// Read a PEM value from the environment; a value that is not PEM is treated as a path
fn load_pem(var: &str) -> Result<String> {
    let value =
        std::env::var(var).map_err(|_| anyhow::anyhow!("{} environment variable not set", var))?;

    if value.starts_with("-----BEGIN") {
        return Ok(value);
    }

    // Try CWD, then the workspace root
    std::fs::read_to_string(&value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push("../..");
            path.push(&value);
            std::fs::read_to_string(path)
        })
        .map(|pem| pem.trim().to_string())
        .map_err(|e| anyhow::anyhow!("Failed to read {} file: {}", var, e))
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key (PEM) or path to it
    /// - `JWT_PUBLIC_KEY`: Public key (PEM) or path to it
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let private_key = load_pem("JWT_PRIVATE_KEY")?;
        let public_key = load_pem("JWT_PUBLIC_KEY")?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            private_key,
            public_key,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    /// Role names, empty on refresh tokens
    pub roles: Vec<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Unique token id, keeps two tokens issued in the same second distinct
    pub jti: Uuid,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

pub(crate) fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    fn sign(&self, account: &Account, roles: Vec<String>, token_type: TokenType) -> Result<String> {
        let now = now_secs()?;
        let lifetime = match token_type {
            TokenType::Access => self.config.access_token_expiry,
            TokenType::Refresh => self.config.refresh_token_expiry,
        };

        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            name: account.display_name.clone(),
            roles,
            iat: now,
            exp: now + lifetime,
            token_type,
            jti: Uuid::new_v4(),
        };

        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?)
    }

    /// Generate an access token for an account
    pub fn generate_access_token(&self, account: &Account, role: Role) -> Result<String> {
        self.sign(account, vec![role.as_str().to_string()], TokenType::Access)
    }

    /// Generate a refresh token for an account
    pub fn generate_refresh_token(&self, account: &Account) -> Result<String> {
        self.sign(account, vec![], TokenType::Refresh)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Check if a token is blacklisted in Redis
    pub async fn is_token_blacklisted(&self, redis_pool: &RedisPool, token: &str) -> Result<bool> {
        redis_pool.exists(&format!("blacklisted_token:{}", token)).await
    }

    /// Blacklist a token in Redis for the given number of seconds
    pub async fn blacklist_token(
        &self,
        redis_pool: &RedisPool,
        token: &str,
        expiry: u64,
    ) -> Result<()> {
        // A zero TTL would never expire
        let ttl = expiry.max(1);
        redis_pool
            .set(&format!("blacklisted_token:{}", token), "1", Some(ttl))
            .await
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }

    /// Rotate a refresh token: blacklist the old one for its remaining lifetime and issue a new one
    pub async fn rotate_refresh_token(
        &self,
        redis_pool: &RedisPool,
        account: &Account,
        old_refresh_token: &str,
    ) -> Result<String> {
        let claims = self.validate_token(old_refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(anyhow::anyhow!("Token is not a refresh token"));
        }

        if claims.sub != account.id {
            return Err(anyhow::anyhow!("Token does not belong to account"));
        }

        let expiry = claims.exp.saturating_sub(now_secs()?);
        self.blacklist_token(redis_pool, old_refresh_token, expiry)
            .await?;

        self.generate_refresh_token(account)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use serial_test::serial;

    pub(crate) fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            private_key: include_str!("../../../keys/dev/private.pem").to_string(),
            public_key: include_str!("../../../keys/dev/public.pem").to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        })
        .unwrap()
    }

    pub(crate) fn test_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            display_name: "Ana".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();
        let account = test_account();

        let token = service
            .generate_access_token(&account, Role::Admin)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.roles, vec!["admin".to_string()]);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_tokens_are_unique_and_roleless() {
        let service = test_service();
        let account = test_account();

        let first = service.generate_refresh_token(&account).unwrap();
        let second = service.generate_refresh_token(&account).unwrap();
        assert_ne!(first, second);

        let claims = service.validate_token(&first).unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let token = service
            .generate_access_token(&test_account(), Role::User)
            .unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.validate_token(&tampered).is_err());
        assert!(service.validate_token("not-a-token").is_err());
    }

    #[test]
    #[serial]
    fn test_config_reads_key_paths_and_defaults() {
        unsafe {
            std::env::set_var("JWT_PRIVATE_KEY", "keys/dev/private.pem");
            std::env::set_var("JWT_PUBLIC_KEY", "keys/dev/public.pem");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
            std::env::set_var("JWT_REFRESH_TOKEN_EXPIRY", "not-a-number");
        }

        let config = JwtConfig::from_env().unwrap();
        assert!(config.private_key.starts_with("-----BEGIN"));
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert!(JwtService::new(config).is_ok());

        unsafe {
            std::env::remove_var("JWT_PRIVATE_KEY");
            std::env::remove_var("JWT_PUBLIC_KEY");
            std::env::remove_var("JWT_REFRESH_TOKEN_EXPIRY");
        }
    }

    #[test]
    #[serial]
    fn test_config_requires_keys() {
        unsafe {
            std::env::remove_var("JWT_PRIVATE_KEY");
        }
        assert!(JwtConfig::from_env().is_err());
    }
}
