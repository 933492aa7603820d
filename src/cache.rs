//! Process-wide cache for encoded documents.
//!
//! Generating and validating a document is expensive relative to serving
//! bytes that already exist, so encoded output is cached per (format, scope).
//! The cache tolerates redundant concurrent computation: two threads racing
//! on the same key may both run the generator, and the last writer wins.

use crate::codec::Format;
use crate::error::Result;
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

/// Cache key: output format plus a caller-chosen scope fingerprint (e.g. a
/// hash of the manifest, or a version string). Differently-scoped documents
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub format: Format,
    pub scope: String,
}

impl CacheKey {
    pub fn new(format: Format, scope: &str) -> Self {
        CacheKey {
            format,
            scope: scope.to_string(),
        }
    }
}

/// Concurrent map from cache key to encoded document bytes.
#[derive(Debug, Default)]
pub struct SpecCache {
    entries: DashMap<CacheKey, Arc<Vec<u8>>>,
}

impl SpecCache {
    pub fn new() -> Self {
        SpecCache::default()
    }

    /// Return the cached bytes for `key`, or run `generate` and cache its
    /// output.
    ///
    /// The generator runs outside any map lock, so concurrent callers on the
    /// same key may each compute the document once; whichever insert lands
    /// last sticks. Generator errors are propagated and nothing is cached.
    pub fn get_or_compute<F>(&self, key: CacheKey, generate: F) -> Result<Arc<Vec<u8>>>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if let Some(entry) = self.entries.get(&key) {
            debug!("spec cache hit for ({}, '{}')", key.format, key.scope);
            return Ok(Arc::clone(&entry));
        }

        debug!("spec cache miss for ({}, '{}')", key.format, key.scope);
        let bytes = Arc::new(generate()?);
        self.entries.insert(key, Arc::clone(&bytes));
        Ok(bytes)
    }

    /// Drop every cached document. Subsequent lookups recompute.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
