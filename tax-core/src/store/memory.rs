use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::factory::{StoreConfig, StoreFactory};
use super::repository::{SessionStore, StoreError, decode_session, encode_session};
use crate::models::TaxSession;

/// In-process store. Values are kept as encoded JSON so it behaves exactly
/// like a persistent backend, including serialization failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.values
            .lock()
            .map_err(|e| StoreError::Backend(format!("memory store lock poisoned: {e}")))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<TaxSession>, StoreError> {
        let values = self.lock()?;
        values.get(key).map(|value| decode_session(value)).transpose()
    }

    async fn save(&self, key: &str, session: &TaxSession) -> Result<(), StoreError> {
        let encoded = encode_session(session)?;
        self.lock()?.insert(key.to_string(), encoded);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self.lock()?.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

/// Registers [`MemoryStore`] under the `memory` backend name.
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, _config: &StoreConfig) -> Result<Box<dyn SessionStore>, StoreError> {
        Ok(Box::new(MemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{DeductionEntry, DeductionItemId, IncomeProfile};

    fn session() -> TaxSession {
        let mut session = TaxSession::default();
        session.income = IncomeProfile::new(dec!(45000), dec!(90000));
        session.plan1 = vec![DeductionEntry::enabled(DeductionItemId::Rmf, dec!(100000))];
        session
    }

    #[tokio::test]
    async fn save_then_load_returns_same_session() {
        let store = MemoryStore::new();

        store.save("default", &session()).await.unwrap();

        assert_eq!(store.load("default").await.unwrap(), Some(session()));
    }

    #[tokio::test]
    async fn load_missing_key_is_none() {
        let store = MemoryStore::new();

        assert_eq!(store.load("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let store = MemoryStore::new();
        store.save("a", &session()).await.unwrap();

        store.delete("a").await.unwrap();

        assert_eq!(store.load("a").await.unwrap(), None);
        assert_eq!(
            store.delete("a").await,
            Err(StoreError::NotFound("a".to_string()))
        );
    }

    #[tokio::test]
    async fn list_keys_is_sorted() {
        let store = MemoryStore::new();
        store.save("b", &session()).await.unwrap();
        store.save("a", &session()).await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn factory_creates_empty_store() {
        let store = MemoryStoreFactory
            .create(&StoreConfig::default())
            .await
            .unwrap();

        assert!(store.list_keys().await.unwrap().is_empty());
    }
}
