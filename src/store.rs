//! # Object Store
//!
//! A content-addressed mapping from 40-hex hash to immutable [`Object`].
//! The store is deliberately narrow - get, put, dump, load - so a
//! disk-backed implementation can be swapped in behind the same trait
//! without the engine noticing. The crate ships [`MemoryObjectStore`],
//! which is what the engine constructs by default.
//!
//! Objects are immutable and keyed by their own content hash, so `put` is
//! idempotent and `get` hands out clones. Nothing is ever deleted; the core
//! has no garbage collection.

use std::collections::HashMap;

use crate::error::{Result, VcsError};
use crate::objects::Object;

/// Content-addressed object repository.
pub trait ObjectStore {
    /// Look up an object by hash. Never fails; absent is `None`.
    fn get(&self, hash: &str) -> Option<Object>;

    /// Store an object under its hash. Writing an existing hash is a no-op.
    fn put(&mut self, hash: String, object: Object);

    /// Export every `(hash, object)` pair. Order is not observable.
    fn dump(&self) -> Vec<(String, Object)>;

    /// Replace the entire store contents.
    ///
    /// Every supplied object is re-hashed and checked against its key;
    /// a mismatch fails with [`VcsError::Corruption`] and leaves the store
    /// unchanged.
    fn load(&mut self, entries: Vec<(String, Object)>) -> Result<()>;
}

/// The default in-memory store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<String, Object>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, hash: &str) -> Option<Object> {
        self.objects.get(hash).cloned()
    }

    fn put(&mut self, hash: String, object: Object) {
        self.objects.entry(hash).or_insert(object);
    }

    fn dump(&self) -> Vec<(String, Object)> {
        self.objects
            .iter()
            .map(|(hash, object)| (hash.clone(), object.clone()))
            .collect()
    }

    fn load(&mut self, entries: Vec<(String, Object)>) -> Result<()> {
        let mut objects = HashMap::with_capacity(entries.len());

        for (hash, object) in entries {
            let actual = object.hash();
            if actual != hash {
                return Err(VcsError::Corruption { hash, actual });
            }
            objects.insert(hash, object);
        }

        self.objects = objects;
        Ok(())
    }
}
