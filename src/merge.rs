//! # Merge Machinery
//!
//! Two halves: finding the merge base in the commit graph, and the
//! three-way reconciliation of flat trees.
//!
//! The merge base search collects every ancestor of `ours` into a set, then
//! walks breadth-first from `theirs`; the first visited commit already in
//! the set is the base. The three-way step walks the union of paths across
//! base, ours, and theirs, and either resolves each path or fails with a
//! conflict. Resolution produces a list of staged [`Change`]s which the
//! engine applies to the working tree only after the whole walk has
//! succeeded - a conflict leaves the working tree untouched.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;

use crate::error::{Result, VcsError};
use crate::objects::Object;
use crate::store::ObjectStore;

/// The result of a merge operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// `theirs` is already reachable from `ours`; nothing to do.
    AlreadyUpToDate,
    /// `ours` was an ancestor of `theirs`; the head moved forward.
    FastForward,
    /// A merge commit was created, with its hash.
    Merged(String),
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::AlreadyUpToDate => write!(f, "Already up to date"),
            MergeOutcome::FastForward => write!(f, "Fast-forward"),
            MergeOutcome::Merged(_) => write!(f, "Merge successful"),
        }
    }
}

/// A staged working-tree mutation produced by three-way resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Take the blob with this hash at this path.
    Write { path: String, hash: String },
    /// Remove this path.
    Delete { path: String },
}

/// Read a commit's parent list out of the store.
fn parents_of(store: &dyn ObjectStore, hash: &str) -> Result<Vec<String>> {
    let object = store
        .get(hash)
        .ok_or_else(|| VcsError::NotFound(format!("commit {}", hash)))?;
    match object {
        Object::Commit(commit) => Ok(commit.parents),
        other => Err(VcsError::InvalidArgument(format!(
            "object {} is a {}, not a commit",
            hash,
            other.kind()
        ))),
    }
}

/// Collect `start` and every ancestor of it, breadth-first.
pub fn ancestor_set(store: &dyn ObjectStore, start: &str) -> Result<HashSet<String>> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(start.to_string());
    queue.push_back(start.to_string());

    while let Some(hash) = queue.pop_front() {
        for parent in parents_of(store, &hash)? {
            if visited.insert(parent.clone()) {
                queue.push_back(parent);
            }
        }
    }

    Ok(visited)
}

/// Find the merge base of `theirs` against a precomputed ancestor set.
///
/// Walks breadth-first from `theirs` and returns the first visited commit
/// present in `ours_ancestors`, so the nearest shared ancestor on the
/// `theirs` side wins. `None` means the histories are unrelated.
pub fn merge_base(
    store: &dyn ObjectStore,
    theirs: &str,
    ours_ancestors: &HashSet<String>,
) -> Result<Option<String>> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(theirs.to_string());
    queue.push_back(theirs.to_string());

    while let Some(hash) = queue.pop_front() {
        if ours_ancestors.contains(&hash) {
            return Ok(Some(hash));
        }
        for parent in parents_of(store, &hash)? {
            if visited.insert(parent.clone()) {
                queue.push_back(parent);
            }
        }
    }

    Ok(None)
}

/// Three-way reconciliation over flat `path -> blob hash` trees.
///
/// For each path in the union, with base/ours/theirs hashes `B`/`O`/`T`:
///
/// - `O == T`: both sides agree (including both deleted) - no change
/// - `B == O`: only theirs moved - take `T` (write, or delete if absent)
/// - `B == T`: only ours moved - keep `O`
/// - otherwise both sides moved differently - conflict
pub fn resolve_three_way(
    base: &BTreeMap<String, String>,
    ours: &BTreeMap<String, String>,
    theirs: &BTreeMap<String, String>,
) -> Result<Vec<Change>> {
    let mut paths = BTreeSet::new();
    paths.extend(base.keys());
    paths.extend(ours.keys());
    paths.extend(theirs.keys());

    let mut changes = Vec::new();

    for path in paths {
        let b = base.get(path);
        let o = ours.get(path);
        let t = theirs.get(path);

        if o == t {
            continue;
        }
        if b == o {
            match t {
                Some(hash) => changes.push(Change::Write {
                    path: path.clone(),
                    hash: hash.clone(),
                }),
                None => changes.push(Change::Delete { path: path.clone() }),
            }
            continue;
        }
        if b == t {
            continue;
        }

        return Err(VcsError::Conflict { path: path.clone() });
    }

    Ok(changes)
}
