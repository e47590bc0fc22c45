//! Authentication service models

pub mod role;
pub mod user;

pub use role::Role;
pub use user::{Account, AccountResponse, LoginCredentials, NewAccount, RegisterRequest};
