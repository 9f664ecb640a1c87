use sqlx::{Error, Pool, Postgres};
use std::future::Future;

pub const URL_KEY: &str = "url";
pub const ACTIVATED_KEY: &str = "activated";

const UPSERT_ENTRY: &str = r#"
    insert into promo_kv(key, value) values ($1, $2)
    on conflict (key) do update set value = excluded.value
"#;

/// Get/put by key. The page handler only ever reads.
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    /// Writes every entry or none of them.
    fn put_all(
        &self,
        entries: &[(&str, &str)],
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

#[derive(Clone)]
pub struct PgStore {
    db_connection_pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(db_connection_pool: Pool<Postgres>) -> Self {
        Self { db_connection_pool }
    }
}

impl KeyValueStore for PgStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        sqlx::query_scalar("select value from promo_kv where key = $1")
            .bind(key)
            .fetch_optional(&self.db_connection_pool)
            .await
    }

    async fn put_all(&self, entries: &[(&str, &str)]) -> Result<(), Error> {
        let mut transaction = self.db_connection_pool.begin().await?;
        for &(key, value) in entries {
            sqlx::query(UPSERT_ENTRY)
                .bind(key)
                .bind(value)
                .execute(&mut *transaction)
                .await?;
        }
        transaction.commit().await
    }
}

#[cfg(test)]
pub mod testing {
    use super::KeyValueStore;
    use sqlx::Error;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};
    use std::time::Duration;

    #[derive(Clone, Default)]
    pub struct MemoryStore {
        entries: Arc<RwLock<HashMap<String, String>>>,
        reads: Arc<AtomicUsize>,
        read_delay: Option<Duration>,
        failing_reads: bool,
        rejected_key: Option<&'static str>,
    }

    impl MemoryStore {
        pub fn with_entries(entries: &[(&str, &str)]) -> Self {
            let store = Self::default();
            {
                let mut map = store.entries.write().unwrap();
                for (key, value) in entries {
                    map.insert(key.to_string(), value.to_string());
                }
            }
            store
        }

        /// Every `get` sleeps before answering.
        pub fn with_read_delay(mut self, delay: Duration) -> Self {
            self.read_delay = Some(delay);
            self
        }

        /// Every `get` fails; writes still succeed.
        pub fn with_failing_reads(mut self) -> Self {
            self.failing_reads = true;
            self
        }

        /// Any `put_all` touching `key` fails without writing anything.
        pub fn rejecting_writes_to(mut self, key: &'static str) -> Self {
            self.rejected_key = Some(key);
            self
        }

        pub fn value(&self, key: &str) -> Option<String> {
            self.entries.read().unwrap().get(key).cloned()
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>, Error> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.read_delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing_reads {
                return Err(Error::PoolTimedOut);
            }
            Ok(self.value(key))
        }

        async fn put_all(&self, entries: &[(&str, &str)]) -> Result<(), Error> {
            if entries
                .iter()
                .any(|&(key, _)| Some(key) == self.rejected_key)
            {
                return Err(Error::PoolTimedOut);
            }
            let mut map = self.entries.write().unwrap();
            for &(key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
            Ok(())
        }
    }

    /// Every call fails, as an unreachable database would.
    #[derive(Clone)]
    pub struct FailingStore;

    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(Error::PoolTimedOut)
        }

        async fn put_all(&self, _entries: &[(&str, &str)]) -> Result<(), Error> {
            Err(Error::PoolTimedOut)
        }
    }

    #[tokio::test]
    async fn memory_store_put_all_overwrites_existing_value() {
        let store = MemoryStore::with_entries(&[("activated", "true")]);
        store.put_all(&[("activated", "false")]).await.unwrap();
        assert_eq!(store.get("activated").await.unwrap().as_deref(), Some("false"));
        assert_eq!(store.get("url").await.unwrap(), None);
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn memory_store_rejected_batch_writes_nothing() {
        let store = MemoryStore::default().rejecting_writes_to("activated");
        let result = store
            .put_all(&[("url", "https://x/?code=NEW"), ("activated", "true")])
            .await;
        assert!(result.is_err());
        assert_eq!(store.value("url"), None);
    }
}
