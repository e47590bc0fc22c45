//! Application state shared across handlers

use news::NewsAggregator;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    live::ChangeHub,
    middleware::TokenVerifier,
    repositories::{
        BlogRepository, ChatRepository, MissingRepository, NewsRepository, PetRepository,
        ProductRepository, UserRepository,
    },
    session::ProfileStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub verifier: TokenVerifier,
    pub profiles: Arc<dyn ProfileStore>,
    pub users: UserRepository,
    pub pets: PetRepository,
    pub missing: MissingRepository,
    pub products: ProductRepository,
    pub blog: BlogRepository,
    pub chat: ChatRepository,
    pub news: NewsRepository,
    pub aggregator: NewsAggregator,
    pub live: ChangeHub,
}

impl AppState {
    /// Wire every repository to one pool; profiles come from the `users` table
    pub fn new(db_pool: PgPool, verifier: TokenVerifier, aggregator: NewsAggregator) -> Self {
        let users = UserRepository::new(db_pool.clone());

        Self {
            verifier,
            profiles: Arc::new(users.clone()),
            users,
            pets: PetRepository::new(db_pool.clone()),
            missing: MissingRepository::new(db_pool.clone()),
            products: ProductRepository::new(db_pool.clone()),
            blog: BlogRepository::new(db_pool.clone()),
            chat: ChatRepository::new(db_pool.clone()),
            news: NewsRepository::new(db_pool.clone()),
            aggregator,
            live: ChangeHub::new(),
            db_pool,
        }
    }
}
