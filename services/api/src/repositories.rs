//! Repositories for database operations

pub mod blog;
pub mod chat;
pub mod missing;
pub mod news;
pub mod pet;
pub mod product;
pub mod user;

pub use blog::BlogRepository;
pub use chat::ChatRepository;
pub use missing::MissingRepository;
pub use news::NewsRepository;
pub use pet::PetRepository;
pub use product::ProductRepository;
pub use user::UserRepository;
