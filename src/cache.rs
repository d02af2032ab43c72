use crate::AqimapError;
use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::task;

/// Cache namespaces backed by their own keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Satellite,
    Climate,
}

impl Namespace {
    fn keyspace_name(self) -> &'static str {
        match self {
            Namespace::Satellite => "satellite",
            Namespace::Climate => "climate",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    payload: Vec<u8>,
    stored_at: i64, // Unix timestamp (milliseconds)
    ttl_ms: u64,
}

impl StoredEntry {
    fn is_fresh(&self, now_ms: i64) -> bool {
        let ttl = i64::try_from(self.ttl_ms).unwrap_or(i64::MAX);
        now_ms < self.stored_at.saturating_add(ttl)
    }
}

/// On-disk store holding one keyspace per [`Namespace`].
///
/// Owned by the application and handed to the HTTP client; dropping the last
/// clone closes the database.
#[derive(Clone)]
pub struct CacheStore {
    satellite: Keyspace,
    climate: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl CacheStore {
    /// Open or create the database at `path`, failing with `Cache` when the
    /// directory or a keyspace cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let failed =
            |e: fjall::Error| AqimapError::cache(format!("opening {}: {e}", path.display()));

        let db = fjall::Database::builder(path).open().map_err(failed)?;
        let satellite = db
            .keyspace(
                Namespace::Satellite.keyspace_name(),
                fjall::KeyspaceCreateOptions::default,
            )
            .map_err(failed)?;
        let climate = db
            .keyspace(
                Namespace::Climate.keyspace_name(),
                fjall::KeyspaceCreateOptions::default,
            )
            .map_err(failed)?;
        Ok(CacheStore { satellite, climate })
    }

    /// A view of one namespace with a fixed TTL.
    #[must_use]
    pub fn namespace(&self, namespace: Namespace, ttl: Duration) -> ResponseCache {
        let store = match namespace {
            Namespace::Satellite => self.satellite.clone(),
            Namespace::Climate => self.climate.clone(),
        };
        ResponseCache {
            namespace,
            store,
            ttl,
        }
    }
}

/// Raw response payloads of a single namespace.
#[derive(Clone)]
pub struct ResponseCache {
    namespace: Namespace,
    store: Keyspace,
    ttl: Duration,
}

impl ResponseCache {
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Stores a payload, replacing any previous entry for the key.
    #[tracing::instrument(
        name = "put_cache",
        level = "debug",
        skip(self, payload),
        fields(namespace = ?self.namespace)
    )]
    pub async fn put(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let entry = StoredEntry {
            payload,
            stored_at: chrono::Utc::now().timestamp_millis(),
            ttl_ms: u64::try_from(self.ttl.as_millis()).map_err(|_| anyhow!("TTL overflow"))?,
        };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a payload if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(
        name = "query_cache",
        level = "debug",
        skip(self),
        fields(namespace = ?self.namespace)
    )]
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get_at(key, chrono::Utc::now().timestamp_millis()).await
    }

    async fn get_at(&self, key: &str, now_ms: i64) -> Result<Option<Vec<u8>>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry = postcard::from_bytes(&bytes)?;
        if entry.is_fresh(now_ms) {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.payload))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> CacheStore {
        CacheStore::open(dir.path()).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir).namespace(Namespace::Climate, Duration::from_secs(3600));

        cache.put("k", b"payload".to_vec()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"payload".to_vec()));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_not_served_and_removed() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir).namespace(Namespace::Satellite, Duration::from_secs(3600));
        cache.put("k", b"old".to_vec()).await.unwrap();

        let later = chrono::Utc::now().timestamp_millis() + 3_600_001;
        assert_eq!(cache.get_at("k", later).await.unwrap(), None);
        // The expired entry was dropped, so even "now" misses.
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let satellite = store.namespace(Namespace::Satellite, Duration::from_secs(60));
        let climate = store.namespace(Namespace::Climate, Duration::from_secs(60));

        satellite.put("same-key", b"sat".to_vec()).await.unwrap();
        assert_eq!(climate.get("same-key").await.unwrap(), None);
        assert_eq!(
            satellite.get("same-key").await.unwrap(),
            Some(b"sat".to_vec())
        );
    }

    #[tokio::test]
    async fn test_overwrite_replaces_entry() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir).namespace(Namespace::Climate, Duration::from_secs(60));
        cache.put("k", b"first".to_vec()).await.unwrap();
        cache.put("k", b"second".to_vec()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_open_fails_with_cache_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = CacheStore::open(file.path().join("db")).err().unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::Cache);
    }

    #[test]
    fn test_freshness_boundary() {
        let entry = StoredEntry {
            payload: vec![],
            stored_at: 1_000,
            ttl_ms: 500,
        };
        assert!(entry.is_fresh(1_499));
        assert!(!entry.is_fresh(1_500));
    }
}
