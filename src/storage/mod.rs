pub mod database;
pub mod site_store;

pub use database::{Database, PoolConfig, SharedDatabase};
pub use site_store::{SiteStore, StoredPage};
