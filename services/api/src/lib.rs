//! PetLoc API service
//!
//! Pets, the lost-and-found board, the marketplace, the community blog and
//! chat, and the aggregated news feed. Every route except `/health` needs a
//! bearer token from the auth service; the caller's role is re-read from the
//! profile table on each request.

pub mod config;
pub mod error;
pub mod live;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;

pub use state::AppState;
