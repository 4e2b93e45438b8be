//! # Tree Building
//!
//! Converts between the two shapes a committed tree takes:
//!
//! 1. The flat form - a sorted map of `relative/path -> blob hash` - which
//!    is what commit, status, and merge actually reason about.
//! 2. The stored form - the Merkle DAG of [`Tree`] objects, one per
//!    directory, each entry sorted by name.
//!
//! [`build_tree`] folds flat into stored (writing every tree into the
//! store), [`flatten_tree`] walks stored back out to flat. Because tree
//! entries are sorted and hashes are content-derived, the same flat mapping
//! always folds to the same root hash, regardless of how it was produced.

use std::collections::BTreeMap;

use crate::error::{Result, VcsError};
use crate::objects::{EntryKind, Object, Tree, TreeEntry};
use crate::store::ObjectStore;

/// Fold a flat `relative path -> blob hash` mapping into a tree DAG.
///
/// Every constructed tree (including the root, and including the empty
/// root for an empty mapping) is written into the store. Returns the root
/// tree hash.
pub fn build_tree(store: &mut dyn ObjectStore, files: &BTreeMap<String, String>) -> String {
    let mut tree = Tree::new();
    let mut subdirs: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    for (path, hash) in files {
        match path.split_once('/') {
            None => tree.add_entry(TreeEntry::file(path.clone(), hash.clone())),
            Some((dir, rest)) => {
                subdirs
                    .entry(dir.to_string())
                    .or_default()
                    .insert(rest.to_string(), hash.clone());
            }
        }
    }

    for (name, children) in &subdirs {
        let subtree_hash = build_tree(store, children);
        tree.add_entry(TreeEntry::directory(name.clone(), subtree_hash));
    }

    tree.sort();
    let hash = tree.hash();
    store.put(hash.clone(), Object::Tree(tree));
    hash
}

/// Flatten a stored tree back into `relative path -> blob hash`.
pub fn flatten_tree(store: &dyn ObjectStore, tree_hash: &str) -> Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    collect(store, tree_hash, "", &mut files)?;
    Ok(files)
}

fn collect(
    store: &dyn ObjectStore,
    hash: &str,
    prefix: &str,
    files: &mut BTreeMap<String, String>,
) -> Result<()> {
    let object = store
        .get(hash)
        .ok_or_else(|| VcsError::NotFound(format!("tree {}", hash)))?;
    let Object::Tree(tree) = object else {
        return Err(VcsError::InvalidArgument(format!(
            "object {} is not a tree",
            hash
        )));
    };

    for entry in &tree.entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", prefix, entry.name)
        };

        match entry.kind {
            EntryKind::Tree => collect(store, &entry.hash, &path, files)?,
            EntryKind::Blob => {
                files.insert(path, entry.hash.clone());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Blob;
    use crate::store::MemoryObjectStore;

    fn store_blob(store: &mut MemoryObjectStore, content: &str) -> String {
        let object = Object::Blob(Blob::new(content));
        let hash = object.hash();
        store.put(hash.clone(), object);
        hash
    }

    #[test]
    fn test_round_trip_nested() {
        let mut store = MemoryObjectStore::new();
        let a = store_blob(&mut store, "a");
        let b = store_blob(&mut store, "b");
        let c = store_blob(&mut store, "c");

        let mut files = BTreeMap::new();
        files.insert("a.txt".to_string(), a);
        files.insert("src/main.ts".to_string(), b);
        files.insert("src/util/helper.ts".to_string(), c);

        let root = build_tree(&mut store, &files);
        let flattened = flatten_tree(&store, &root).unwrap();
        assert_eq!(flattened, files);
    }

    #[test]
    fn test_root_hash_independent_of_insertion_history() {
        let mut store_one = MemoryObjectStore::new();
        let mut store_two = MemoryObjectStore::new();
        let hash = store_blob(&mut store_one, "same");
        store_blob(&mut store_two, "same");

        // Maps built in different orders still compare equal, and fold to
        // the same root.
        let mut first = BTreeMap::new();
        first.insert("z.txt".to_string(), hash.clone());
        first.insert("a/b.txt".to_string(), hash.clone());

        let mut second = BTreeMap::new();
        second.insert("a/b.txt".to_string(), hash.clone());
        second.insert("z.txt".to_string(), hash);

        assert_eq!(
            build_tree(&mut store_one, &first),
            build_tree(&mut store_two, &second)
        );
    }

    #[test]
    fn test_empty_mapping_builds_empty_root() {
        let mut store = MemoryObjectStore::new();
        let root = build_tree(&mut store, &BTreeMap::new());
        assert_eq!(flatten_tree(&store, &root).unwrap(), BTreeMap::new());
    }

    #[test]
    fn test_flatten_missing_tree_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = flatten_tree(&store, &"0".repeat(40)).unwrap_err();
        assert!(matches!(err, VcsError::NotFound(_)));
    }
}
