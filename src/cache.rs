//! Pluggable response caches.
//!
//! The client hands the cache the raw response bytes together with a key
//! derived from the request (see [`Request::cache_key`](crate::Request::cache_key)).
//! Entries are opaque to the client; lifetime and durability are up to the
//! implementation.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant, SystemTime};

/// Trait for cache implementations.
pub trait Cache: Send + Sync {
    /// Get a cached payload by key, `None` on a miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a payload in the cache.
    ///
    /// A failure aborts the fetch that produced the payload.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Hex-encoded SHA-256 digest of `s`.
pub(crate) fn hash_string(s: &str) -> String {
    hex::encode(Sha256::digest(s.as_bytes()))
}

struct MemoryEntry {
    value: Vec<u8>,
    stored_at: Instant,
}

/// In-memory cache implementation with O(1) eviction.
pub struct MemoryCache {
    store: Arc<RwLock<HashMap<String, MemoryEntry>>>,
    order: Arc<RwLock<VecDeque<String>>>,
    max_entries: usize,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Create a new memory cache with the given maximum entries.
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            store: Arc::new(RwLock::new(HashMap::with_capacity(max_entries))),
            order: Arc::new(RwLock::new(VecDeque::with_capacity(max_entries))),
            max_entries,
            ttl: None,
        }
    }

    /// Expire entries after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Get the current number of entries.
    pub fn size(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Clear all entries.
    pub fn clear(&self) {
        if let (Ok(mut store), Ok(mut order)) = (self.store.write(), self.order.write()) {
            store.clear();
            order.clear();
        }
    }
}

impl MemoryCache {
    fn remove_expired(&self, key: &str) {
        let (Ok(mut store), Ok(mut order)) = (self.store.write(), self.order.write()) else {
            return;
        };
        // Another caller may have refreshed the entry in between
        let expired = match (store.get(key), self.ttl) {
            (Some(entry), Some(ttl)) => entry.stored_at.elapsed() >= ttl,
            _ => false,
        };
        if expired {
            store.remove(key);
            order.retain(|k| k != key);
        }
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        {
            let store = self.store.read().ok()?;
            let entry = store.get(key)?;
            match self.ttl {
                Some(ttl) if entry.stored_at.elapsed() >= ttl => {}
                _ => return Some(entry.value.clone()),
            }
        }

        self.remove_expired(key);
        None
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut store = self
            .store
            .write()
            .map_err(|_| Error::Cache("memory cache lock poisoned".into()))?;
        let mut order = self
            .order
            .write()
            .map_err(|_| Error::Cache("memory cache lock poisoned".into()))?;

        if !store.contains_key(key) {
            // Evict oldest if at capacity (O(1) with VecDeque)
            while store.len() >= self.max_entries {
                match order.pop_front() {
                    Some(oldest) => {
                        store.remove(&oldest);
                    }
                    None => break,
                }
            }
            order.push_back(key.to_string());
        }

        store.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Cache storing each payload as a file in a directory.
///
/// File names are a hash of the key, so arbitrary keys are safe. Payloads
/// are written to a temporary file and renamed into place, so a reader
/// never observes a partially written entry.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    max_age: Option<Duration>,
}

impl FileCache {
    /// Cache files under `dir`, which is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_age: None,
        }
    }

    /// Cache files under the system temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("quandl-cache"))
    }

    /// Treat files older than `max_age` as missing.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// The directory holding the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("quandl-{}", hash_string(key)))
    }

    fn temp_path_for(&self, path: &Path) -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("quandl");
        self.dir.join(format!(".{}.{}.{}.tmp", name, std::process::id(), n))
    }

    fn is_fresh(&self, path: &Path) -> bool {
        let Some(max_age) = self.max_age else {
            return true;
        };
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age < max_age)
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        if !self.is_fresh(&path) {
            return None;
        }
        fs::read(path).ok()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Cache(format!("cannot create {}: {}", self.dir.display(), e))
        })?;
        let path = self.path_for(key);
        let tmp_path = self.temp_path_for(&path);

        fs::write(&tmp_path, value).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            Error::Cache(format!("cannot write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            Error::Cache(format!(
                "cannot rename {} to {}: {}",
                tmp_path.display(),
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache() {
        let cache = MemoryCache::new(2);

        cache.set("k1", b"v1").unwrap();

        assert_eq!(cache.get("k1").as_deref(), Some(&b"v1"[..]));
        assert!(cache.get("k2").is_none());

        cache.clear();
        assert!(cache.get("k1").is_none());
    }

    #[test]
    fn test_memory_cache_evicts_oldest() {
        let cache = MemoryCache::new(2);
        cache.set("a", b"1").unwrap();
        cache.set("b", b"2").unwrap();
        cache.set("a", b"3").unwrap();
        assert_eq!(cache.size(), 2);

        cache.set("c", b"4").unwrap();
        assert_eq!(cache.size(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").as_deref(), Some(&b"2"[..]));
        assert_eq!(cache.get("c").as_deref(), Some(&b"4"[..]));
    }

    #[test]
    fn test_memory_cache_ttl() {
        let cache = MemoryCache::new(4).with_ttl(Duration::ZERO);
        cache.set("k", b"v").unwrap();
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_memory_cache_expired_entry_is_dropped() {
        let cache = MemoryCache::new(1).with_ttl(Duration::ZERO);
        cache.set("old", b"v").unwrap();
        assert_eq!(cache.size(), 1);

        assert!(cache.get("old").is_none());
        assert_eq!(cache.size(), 0);
        assert!(cache.order.read().unwrap().is_empty());

        let fresh = MemoryCache::new(4).with_ttl(Duration::from_secs(60));
        fresh.set("k", b"v").unwrap();
        assert_eq!(fresh.get("k").as_deref(), Some(&b"v"[..]));
        assert_eq!(fresh.size(), 1);
    }

    #[test]
    fn test_file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"));

        assert!(cache.get("https://www.quandl.com/a?b=c").is_none());
        cache.set("https://www.quandl.com/a?b=c", b"payload").unwrap();
        assert_eq!(
            cache.get("https://www.quandl.com/a?b=c").as_deref(),
            Some(&b"payload"[..])
        );
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn test_file_cache_max_age() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).with_max_age(Duration::ZERO);
        cache.set("k", b"v").unwrap();
        assert!(cache.get("k").is_none());

        let fresh = FileCache::new(dir.path()).with_max_age(Duration::from_secs(60));
        assert_eq!(fresh.get("k").as_deref(), Some(&b"v"[..]));
    }

    #[test]
    fn test_file_cache_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());

        cache.set("k", b"first").unwrap();
        cache.set("k", b"second").unwrap();
        assert_eq!(cache.get("k").as_deref(), Some(&b"second"[..]));

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("quandl-{}", hash_string("k"))]);
    }

    #[test]
    fn test_file_cache_readers_never_see_partial_payload() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(FileCache::new(dir.path()));
        let payload = vec![b'x'; 256 * 1024];
        cache.set("k", &payload).unwrap();

        let writer = {
            let cache = cache.clone();
            let payload = payload.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    cache.set("k", &payload).unwrap();
                }
            })
        };
        for _ in 0..200 {
            let hit = cache.get("k").unwrap();
            assert_eq!(hit.len(), payload.len());
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_file_cache_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let cache = FileCache::new(blocker.join("sub"));
        let err = cache.set("k", b"v").unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
    }

    #[test]
    fn test_hash_string() {
        let h1 = hash_string("test");
        let h2 = hash_string("test");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);

        let h3 = hash_string("other");
        assert_ne!(h1, h3);
    }
}
