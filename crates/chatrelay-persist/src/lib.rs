pub mod builder;
pub mod dbs;
pub mod error;
pub mod notify;
pub mod settings;
pub mod subscription;
pub mod trait_client;

pub use builder::StoreBuilder;
pub use dbs::MemoryStore;
#[cfg(feature = "sqlite")]
pub use dbs::SqliteStore;
pub use error::{PersistError, Result};
pub use notify::ChangeBus;
pub use settings::{FileSettings, MemorySettings, Settings, SettingsStore};
pub use subscription::{watch_chats, watch_messages};
pub use trait_client::MessageStore;
