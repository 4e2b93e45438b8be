//! # Snapshot Serialization
//!
//! A snapshot is one self-describing JSON document holding the entire
//! engine state: every stored object, every ref, `HEAD`, and every live
//! working-tree file. Saving writes it pretty-printed; loading parses and
//! validates the whole document - recomputing every object hash - before a
//! single field of the engine changes, so a bad file can never leave the
//! engine half-loaded.
//!
//! ## Document shape
//!
//! ```json
//! {
//!   "objects": [["<40-hex>", {"type": "blob", "content": "..."}], ...],
//!   "refs": [["refs/heads/main", "<40-hex or empty>"], ...],
//!   "head": "refs/heads/main",
//!   "workingFiles": [{"path": "/main.ts", "content": "..."}, ...]
//! }
//! ```
//!
//! An unborn ref is the empty string on the wire and `None` in memory.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{Result, VcsError};
use crate::objects::Object;
use crate::refs::Head;
use crate::worktree::WorkingTree;

/// One working-tree file in the snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingFile {
    /// Absolute path, as the working tree stores it.
    pub path: String,
    /// File content.
    pub content: String,
}

/// The snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every `(hash, object)` pair in the store, sorted by hash.
    pub objects: Vec<(String, Object)>,
    /// Every `(name, hash)` ref row; unborn refs hold the empty string.
    pub refs: Vec<(String, String)>,
    /// `HEAD` in wire form: a ref name, or a 40-hex hash when detached.
    pub head: String,
    /// Every live working-tree file.
    #[serde(rename = "workingFiles")]
    pub working_files: Vec<WorkingFile>,
}

/// Capture the engine's state as a snapshot document.
pub fn capture(engine: &Engine) -> Snapshot {
    let mut objects = engine.store.dump();
    objects.sort_by(|a, b| a.0.cmp(&b.0));

    let refs = engine
        .refs
        .iter()
        .map(|(name, value)| (name.clone(), value.clone().unwrap_or_default()))
        .collect();

    let working_files = engine
        .worktree
        .iter()
        .map(|entry| WorkingFile {
            path: entry.path.clone(),
            content: entry.content.clone(),
        })
        .collect();

    Snapshot {
        objects,
        refs,
        head: engine.head.as_str().to_string(),
        working_files,
    }
}

/// Save the engine's state to `path` as pretty-printed UTF-8 JSON.
pub fn save(engine: &Engine, path: &Path) -> Result<()> {
    let document = serde_json::to_string_pretty(&capture(engine))?;
    fs::write(path, document)?;
    tracing::debug!(path = %path.display(), "saved snapshot");
    Ok(())
}

/// Restore the engine's state from a snapshot file.
///
/// Everything is parsed and validated first; the engine is only mutated
/// once nothing can fail anymore.
pub fn load(engine: &mut Engine, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let document: Snapshot = serde_json::from_str(&text)?;
    restore(engine, document)?;
    tracing::debug!(path = %path.display(), "loaded snapshot");
    Ok(())
}

/// Apply a parsed snapshot document to the engine.
pub fn restore(engine: &mut Engine, document: Snapshot) -> Result<()> {
    // Integrity: every object must hash to its key.
    let mut known_hashes = HashSet::new();
    for (hash, object) in &document.objects {
        let actual = object.hash();
        if actual != *hash {
            return Err(VcsError::Corruption {
                hash: hash.clone(),
                actual,
            });
        }
        known_hashes.insert(hash.clone());
    }

    let mut refs = BTreeMap::new();
    for (name, value) in document.refs {
        let value = if value.is_empty() { None } else { Some(value) };
        refs.insert(name, value);
    }

    let head = Head::parse(&document.head);
    match &head {
        Head::Symbolic(name) if !refs.contains_key(name) => {
            return Err(VcsError::InvalidArgument(format!(
                "snapshot HEAD names unknown ref '{}'",
                name
            )));
        }
        Head::Detached(hash) if !known_hashes.contains(hash) => {
            return Err(VcsError::InvalidArgument(format!(
                "snapshot HEAD names unknown commit {}",
                hash
            )));
        }
        _ => {}
    }

    let mut worktree = WorkingTree::new();
    for file in document.working_files {
        worktree.write(file.path, file.content);
    }

    // Validated above, so the store load cannot fail and the swap below is
    // effectively atomic.
    engine.store.load(document.objects)?;
    engine.refs.replace(refs);
    engine.head = head;
    engine.worktree = worktree;
    Ok(())
}
