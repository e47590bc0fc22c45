//! Pet news aggregation for the PetLoc community feed
//!
//! Four independent sources are queried concurrently on every call and merged
//! into one list ordered by publish time, newest first. A source that fails
//! contributes nothing; the aggregate itself never fails.

pub mod aggregator;
pub mod article;
pub mod category;
pub mod config;
pub mod error;
pub mod sources;

pub use aggregator::NewsAggregator;
pub use article::NewsArticle;
pub use category::{Category, categorize};
pub use config::NewsConfig;
pub use error::NewsError;
pub use sources::NewsSource;
