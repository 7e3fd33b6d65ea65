mod pool;
mod store;

pub use pool::{database_url, DatabasePool};
pub use store::SqliteStore;
