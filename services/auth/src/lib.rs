//! PetLoc authentication service
//!
//! Registration, login, token refresh and logout. Accounts live in
//! PostgreSQL next to their profile row; refresh-token sessions and the token
//! blacklist live in Redis.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod validation;

use common::cache::RedisPool;
use sqlx::PgPool;

use crate::{
    jwt::JwtService, rate_limiter::RateLimiter, repositories::UserRepository,
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub sessions: SessionManager,
    pub rate_limiter: RateLimiter,
}
