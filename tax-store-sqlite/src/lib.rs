//! SQLite backend for the session key-value store.

mod factory;
mod store;

pub use factory::SqliteStoreFactory;
pub use store::SqliteSessionStore;
