use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tax_core::store::repository::{decode_session, encode_session};
use tax_core::{SessionStore, StoreError, TaxSession};
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Opens `path`, creating the file if needed. `:memory:` opens a private
    /// in-memory database on a single connection.
    pub async fn new(path: &str) -> Result<Self> {
        let pool = if path == ":memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await
                .context("Failed to open in-memory database")?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .connect_with(options)
                .await
                .with_context(|| format!("Failed to connect to database: {}", path))?
        };
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// When `key` was last saved, if it exists.
    pub async fn updated_at(
        &self,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT updated_at FROM session_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(|(ts,)| parse_datetime(&ts)).transpose()
    }
}

#[derive(FromRow)]
struct SessionRow {
    value: String,
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Backend(format!("Failed to parse datetime '{}': {}", s, e)))
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, key: &str) -> Result<Option<TaxSession>, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as("SELECT value FROM session_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(|r| decode_session(&r.value)).transpose()
    }

    async fn save(&self, key: &str, session: &TaxSession) -> Result<(), StoreError> {
        let value = encode_session(session)?;
        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();

        sqlx::query(
            "INSERT INTO session_kv (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(&value)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(key, bytes = value.len(), "session saved");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM session_kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(key.to_string()));
        }

        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM session_kv ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(|(key,)| key).collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{DeductionEntry, DeductionItemId, IncomeProfile, Scenario};

    use super::*;

    async fn setup_test_db() -> SqliteSessionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let store = SqliteSessionStore::new_with_pool(pool).await;
        store.run_migrations().await.expect("Failed to run migrations");
        store
    }

    fn test_session() -> TaxSession {
        let mut session = TaxSession::default();
        session.income = IncomeProfile::new(dec!(45000), dec!(90000));
        session.basic.monthly_social_security = dec!(750);
        session.set_entry(
            Scenario::Plan1,
            DeductionEntry::enabled(DeductionItemId::LifeInsurance, dec!(30000)),
        );
        session.set_entry(
            Scenario::Plan2,
            DeductionEntry::disabled(DeductionItemId::HomeLoan, dec!(80000)),
        );
        session
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = setup_test_db().await;

        store.save("default", &test_session()).await.expect("Should save session");
        let loaded = store.load("default").await.expect("Should load session");

        assert_eq!(loaded, Some(test_session()));
    }

    #[tokio::test]
    async fn test_load_missing_key() {
        let store = setup_test_db().await;

        let loaded = store.load("missing").await.expect("Should query");

        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = setup_test_db().await;
        store.save("default", &test_session()).await.expect("Should save session");

        let mut changed = test_session();
        changed.income.annual_bonus = dec!(0);
        store.save("default", &changed).await.expect("Should overwrite session");

        let loaded = store.load("default").await.expect("Should load session");
        assert_eq!(loaded.map(|s| s.income.annual_bonus), Some(dec!(0)));
        assert_eq!(store.list_keys().await.expect("Should list keys").len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = setup_test_db().await;
        store.save("default", &test_session()).await.expect("Should save session");

        store.delete("default").await.expect("Should delete session");

        assert_eq!(store.load("default").await.expect("Should query"), None);
        assert!(matches!(
            store.delete("default").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_keys_sorted() {
        let store = setup_test_db().await;
        store.save("zeta", &test_session()).await.expect("Should save session");
        store.save("alpha", &test_session()).await.expect("Should save session");

        let keys = store.list_keys().await.expect("Should list keys");

        assert_eq!(keys, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_value_is_serialization_error() {
        let store = setup_test_db().await;
        sqlx::query("INSERT INTO session_kv (key, value, updated_at) VALUES ('bad', '{not json', '2025-01-01 00:00:00')")
            .execute(store.pool())
            .await
            .expect("Failed to insert corrupt row");

        let result = store.load("bad").await;

        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_updated_at_is_recorded() {
        let store = setup_test_db().await;
        store.save("default", &test_session()).await.expect("Should save session");

        let stamp = store.updated_at("default").await.expect("Should query");

        assert!(stamp.is_some());
        assert_eq!(store.updated_at("missing").await.expect("Should query"), None);
    }
}
