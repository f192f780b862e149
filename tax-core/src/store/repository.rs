use async_trait::async_trait;
use thiserror::Error;

use crate::models::TaxSession;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No session stored under '{0}'")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Opaque key-value persistence for [`TaxSession`]s.
///
/// Values are stored as JSON; the engine never reads a store directly.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<TaxSession>, StoreError>;

    /// Inserts or replaces the session under `key`.
    async fn save(&self, key: &str, session: &TaxSession) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] when `key` is absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Stored keys, sorted.
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Encodes a session in the store's value format.
pub fn encode_session(session: &TaxSession) -> Result<String, StoreError> {
    Ok(serde_json::to_string(session)?)
}

/// Decodes a stored value.
pub fn decode_session(value: &str) -> Result<TaxSession, StoreError> {
    Ok(serde_json::from_str(value)?)
}
