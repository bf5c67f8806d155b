//! Pluggable embedding cache backends
//!
//! The embedding novelty scorer never computes embeddings itself. It reads
//! precomputed vectors from one of these backends, keyed by a hash of the
//! text and the scorer configuration.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// Synchronous key/vector store
pub trait EmbeddingCache: Debug {
    /// Backend name for logs and provenance
    fn name(&self) -> &str;

    /// Look up a vector by key
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, CacheError>;

    /// Store a vector under key
    fn set(&mut self, key: &str, value: &[f64]) -> Result<(), CacheError>;
}

/// In-memory cache backend
#[derive(Debug, Default, Clone)]
pub struct InMemoryEmbeddingCache {
    storage: HashMap<String, Vec<f64>>,
}

impl InMemoryEmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl EmbeddingCache for InMemoryEmbeddingCache {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, CacheError> {
        Ok(self.storage.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[f64]) -> Result<(), CacheError> {
        self.storage.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Filesystem cache storing one JSON array file per key (`<dir>/<key>.json`)
#[derive(Debug, Clone)]
pub struct JsonDirectoryEmbeddingCache {
    dir: PathBuf,
}

impl JsonDirectoryEmbeddingCache {
    /// Open (creating if needed) a cache directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl EmbeddingCache for JsonDirectoryEmbeddingCache {
    fn name(&self) -> &str {
        "json_directory"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, CacheError> {
        let path = self.path_for_key(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn set(&mut self, key: &str, value: &[f64]) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)?;
        fs::write(self.path_for_key(key), payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache() {
        let mut cache = InMemoryEmbeddingCache::new();
        assert!(cache.get("k").unwrap().is_none());
        cache.set("k", &[1.0, 0.5]).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(vec![1.0, 0.5]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_json_directory_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = JsonDirectoryEmbeddingCache::open(tmp.path().join("emb")).unwrap();
        assert!(cache.get("abc").unwrap().is_none());

        cache.set("abc", &[0.25, -1.0, 3.0]).unwrap();
        assert!(tmp.path().join("emb").join("abc.json").exists());

        // A fresh handle on the same directory sees the entry
        let reopened = JsonDirectoryEmbeddingCache::open(cache.dir()).unwrap();
        assert_eq!(reopened.get("abc").unwrap(), Some(vec![0.25, -1.0, 3.0]));
    }

    #[test]
    fn test_json_directory_cache_corrupt_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = JsonDirectoryEmbeddingCache::open(tmp.path()).unwrap();
        fs::write(tmp.path().join("bad.json"), "not json").unwrap();
        assert!(matches!(cache.get("bad"), Err(CacheError::Serialization(_))));
    }
}
