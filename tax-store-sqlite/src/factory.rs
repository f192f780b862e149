use async_trait::async_trait;

use tax_core::store::{StoreConfig, StoreFactory};
use tax_core::{SessionStore, StoreError};

use crate::store::SqliteSessionStore;

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`tax_core::store::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use tax_core::store::StoreRegistry;
/// use tax_store_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database at `config.connection_string` and run migrations.
    ///
    /// Accepted values:
    /// * A bare file path, e.g. `"sessions.db"`. Created if missing.
    /// * `":memory:"` for an ephemeral database.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn SessionStore>, StoreError> {
        let store = SqliteSessionStore::new(&config.connection_string)
            .await
            .map_err(|e| StoreError::Connection(format!("{e:#}")))?;
        store
            .run_migrations()
            .await
            .map_err(|e| StoreError::Backend(format!("{e:#}")))?;
        Ok(Box::new(store))
    }
}
