//! Authentication middleware for JWT token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::ApiError,
    session::{Identity, Session, resolve_session},
    state::AppState,
};

/// Claims issued by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    /// Informational; the profile row is authoritative
    pub roles: Vec<String>,
    pub iat: u64,
    pub exp: u64,
    pub token_type: TokenType,
    pub jti: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// RS256 verifier built once from the auth service's public key
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(public_key_pem: &str) -> anyhow::Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Identity from a valid access token; refresh tokens are rejected
    pub fn verify(&self, token: &str) -> Result<Identity, ApiError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                info!("Rejected token: {}", e);
                ApiError::Unauthorized
            })?
            .claims;

        if claims.token_type != TokenType::Access {
            return Err(ApiError::Unauthorized);
        }

        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
        })
    }
}

/// Verify the bearer token, resolve the caller's role and attach the [`Session`]
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;
    let identity = state.verifier.verify(bearer.token())?;

    let session = resolve_session(state.profiles.as_ref(), identity).await;
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

/// Gate for `/admin` routes; runs inside [`auth_middleware`]
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    req.extensions()
        .get::<Session>()
        .ok_or(ApiError::Unauthorized)?
        .require_admin()?;

    Ok(next.run(req).await)
}
