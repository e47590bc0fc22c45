//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    AppState,
    jwt::{Claims, TokenType, now_secs},
    middleware::auth_middleware,
    models::{Account, AccountResponse, LoginCredentials, NewAccount, RegisterRequest, Role},
    validation::{validate_email, validate_registration},
};

/// Tokens issued on register, login and refresh
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub account: AccountResponse,
}

/// Request carrying a refresh token
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Errors returned by the authentication endpoints
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Too many failed login attempts, try again later")]
    TooManyRequests,

    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Profile role for a token; lookup failures degrade to `user`
async fn resolve_role(state: &AppState, account: &Account) -> Role {
    match state.user_repository.ensure_profile(account).await {
        Ok(role) => role,
        Err(e) => {
            warn!(
                "Role lookup failed for {}, continuing as user: {}",
                account.id, e
            );
            Role::User
        }
    }
}

/// Sign a token pair and make the refresh token the account's current session
async fn issue_tokens(
    state: &AppState,
    account: &Account,
    role: Role,
) -> Result<TokenResponse, AuthError> {
    let access_token = state
        .jwt_service
        .generate_access_token(account, role)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(account)
        .map_err(|e| {
            error!("Failed to generate refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .sessions
        .store(account.id, &refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to store session in Redis: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        account: AccountResponse::new(account, role),
    })
}

/// Registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    validate_registration(&payload).map_err(AuthError::BadRequest)?;

    let email = payload.email.trim().to_string();
    info!("Registration attempt for: {}", email);

    let taken = state
        .user_repository
        .email_exists(&email)
        .await
        .map_err(|e| {
            error!("Failed to check email availability: {}", e);
            AuthError::InternalServerError
        })?;

    if taken {
        return Err(AuthError::Conflict("Email is already in use".to_string()));
    }

    let account = state
        .user_repository
        .create(&NewAccount {
            email,
            display_name: payload.display_name.trim().to_string(),
            password: payload.password,
        })
        .await
        .map_err(|e| {
            // The unique index still guards a concurrent registration
            if let Some(sqlx::Error::Database(db)) = e.downcast_ref::<sqlx::Error>() {
                if db.is_unique_violation() {
                    return AuthError::Conflict("Email is already in use".to_string());
                }
            }
            error!("Failed to create account: {}", e);
            AuthError::InternalServerError
        })?;

    let response = issue_tokens(&state, &account, Role::User).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    let email = payload.email.trim();
    validate_email(email).map_err(AuthError::BadRequest)?;

    if state.rate_limiter.is_locked(email).await {
        return Err(AuthError::TooManyRequests);
    }

    info!("Login attempt for: {}", email);

    let account = state
        .user_repository
        .find_by_email(email)
        .await
        .map_err(|e| {
            error!("Failed to look up account: {}", e);
            AuthError::InternalServerError
        })?;

    let verified = match &account {
        Some(account) => state
            .user_repository
            .verify_password(account, &payload.password)
            .map_err(|e| {
                error!("Failed to verify password: {}", e);
                AuthError::InternalServerError
            })?,
        None => false,
    };

    let Some(account) = account.filter(|_| verified) else {
        state.rate_limiter.record_failure(email).await;
        return Err(AuthError::Unauthorized);
    };

    state.rate_limiter.reset(email).await;

    let role = resolve_role(&state, &account).await;
    let response = issue_tokens(&state, &account, role).await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Validate a refresh token that must be the account's current, non-blacklisted session
async fn check_refresh_token(state: &AppState, token: &str) -> Result<Claims, AuthError> {
    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::Unauthorized);
    }

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, token)
        .await
        .map_err(|e| {
            error!("Failed to check if token is blacklisted: {}", e);
            AuthError::InternalServerError
        })?;

    if is_blacklisted {
        return Err(AuthError::Unauthorized);
    }

    Ok(claims)
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let claims = check_refresh_token(&state, &payload.refresh_token).await?;

    let current = state
        .sessions
        .is_current(claims.sub, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to read session: {}", e);
            AuthError::InternalServerError
        })?;

    if !current {
        return Err(AuthError::Unauthorized);
    }

    let account = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to look up account: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let role = resolve_role(&state, &account).await;

    let access_token = state
        .jwt_service
        .generate_access_token(&account, role)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let new_refresh_token = state
        .jwt_service
        .rotate_refresh_token(&state.redis_pool, &account, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to rotate refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .sessions
        .store(account.id, &new_refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to update session in Redis: {}", e);
            AuthError::InternalServerError
        })?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            access_token,
            refresh_token: new_refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: state.jwt_service.access_token_expiry(),
            account: AccountResponse::new(&account, role),
        }),
    ))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Logout request");

    let claims = check_refresh_token(&state, &payload.refresh_token).await?;

    let now = now_secs().map_err(|e| {
        error!("{}", e);
        AuthError::InternalServerError
    })?;

    state
        .jwt_service
        .blacklist_token(
            &state.redis_pool,
            &payload.refresh_token,
            claims.exp.saturating_sub(now),
        )
        .await
        .map_err(|e| {
            error!("Failed to blacklist token: {}", e);
            AuthError::InternalServerError
        })?;

    state.sessions.delete(claims.sub).await.map_err(|e| {
        error!("Failed to remove session from Redis: {}", e);
        AuthError::InternalServerError
    })?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Current account, with the role re-read from its profile
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AuthError> {
    let account = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to look up account: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let role = resolve_role(&state, &account).await;

    Ok(Json(AccountResponse::new(&account, role)))
}
