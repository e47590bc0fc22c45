//! API service configuration

use anyhow::Result;
use std::env;

/// Settings read once at start-up
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// PEM used to verify access tokens issued by the auth service
    pub jwt_public_key: String,
}

impl ApiConfig {
    /// # Environment Variables
    /// - `API_BIND_ADDR`: listen address (default: "0.0.0.0:3001")
    /// - `JWT_PUBLIC_KEY`: public key (PEM) or path to it
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());

        let public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PUBLIC_KEY environment variable not set"))?;

        // Not PEM: treat as a path, from CWD or the workspace root
        let jwt_public_key = if public_key.starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push("../..");
                    path.push(&public_key);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| anyhow::anyhow!("Failed to read public key file: {}", e))?
                .trim()
                .to_string()
        };

        Ok(ApiConfig {
            bind_addr,
            jwt_public_key,
        })
    }
}
