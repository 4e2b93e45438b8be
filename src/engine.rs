//! # Version Engine
//!
//! The orchestrator that ties the layers together: the working tree holds
//! live files, the ignore filter trims enumeration, the object store holds
//! immutable history, and the reference table plus `HEAD` say where in that
//! history we are.
//!
//! ## Data Flow
//!
//! - Mutation (`write` / `delete`) touches only the working tree.
//! - `commit` projects the filtered working tree into blobs, folds the flat
//!   mapping into a tree DAG, writes a commit object, then advances the
//!   reference `HEAD` points through (or `HEAD` itself when detached).
//! - `checkout` walks a commit's tree back out into the working tree,
//!   destroying uncommitted edits - that is the documented contract.
//! - `merge` finds the common ancestor of `HEAD` and a branch, reconciles
//!   the three trees, and commits the result with two parents.
//!
//! All operations are synchronous and expect a single caller at a time;
//! callers on preemptive threads must serialize access themselves.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, VcsError};
use crate::ignore::IgnoreFilter;
use crate::merge::{ancestor_set, merge_base, resolve_three_way, Change, MergeOutcome};
use crate::objects::{Blob, Commit, Object};
use crate::refs::{Head, RefTable, HEADS_PREFIX};
use crate::snapshot;
use crate::store::{MemoryObjectStore, ObjectStore};
use crate::tree_builder::{build_tree, flatten_tree};
use crate::worktree::{FileEntry, WorkingTree};

/// Author recorded when the caller does not supply one.
pub const DEFAULT_AUTHOR: &str = "verfs";

/// Working-tree file the ignore filter is loaded from.
const GITIGNORE: &str = ".gitignore";

/// Supplies commit timestamps in milliseconds since the Unix epoch.
///
/// The default reads the wall clock; tests inject a fixed value.
pub type Clock = Box<dyn Fn() -> i64 + Send>;

fn wall_clock() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Options for [`Engine::read_dir`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadDirOptions {
    /// Return each descendant's full relative path instead of the unique
    /// immediate child segments.
    pub recursive: bool,
    /// Drop paths matched by the working tree's root `.gitignore`.
    pub ignore: bool,
}

/// The three disjoint lists produced by [`Engine::status`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    /// In the (filtered) working tree but not in the `HEAD` tree.
    pub new: Vec<String>,
    /// In both, with differing blob hashes.
    pub modified: Vec<String>,
    /// In the `HEAD` tree but not in the working tree.
    pub deleted: Vec<String>,
}

/// One commit in [`Engine::log`] output.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// The commit's hash.
    pub hash: String,
    /// The commit itself.
    pub commit: Commit,
}

/// Everything the engine knows, for inspection and snapshot comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseDump {
    /// Every stored object, sorted by hash.
    pub objects: Vec<(String, Object)>,
    /// Every ref; an unborn ref carries the empty string.
    pub refs: Vec<(String, String)>,
    /// The `HEAD` cell in wire form.
    pub head: String,
}

/// The version control engine.
pub struct Engine {
    pub(crate) root: String,
    pub(crate) store: Box<dyn ObjectStore>,
    pub(crate) worktree: WorkingTree,
    pub(crate) refs: RefTable,
    pub(crate) head: Head,
    clock: Clock,
}

impl Engine {
    /// Create an engine rooted at `root` with the in-memory store.
    pub fn new(root: impl Into<String>) -> Self {
        Self::with_clock(root, Box::new(wall_clock))
    }

    /// Create an engine with an injected clock (for deterministic tests).
    pub fn with_clock(root: impl Into<String>, clock: Clock) -> Self {
        Self::with_store_and_clock(root, Box::new(MemoryObjectStore::new()), clock)
    }

    /// Create an engine over a caller-provided object store.
    pub fn with_store(root: impl Into<String>, store: Box<dyn ObjectStore>) -> Self {
        Self::with_store_and_clock(root, store, Box::new(wall_clock))
    }

    fn with_store_and_clock(root: impl Into<String>, store: Box<dyn ObjectStore>, clock: Clock) -> Self {
        Self {
            root: normalize_root(root.into()),
            store,
            worktree: WorkingTree::new(),
            refs: RefTable::new(),
            head: Head::default(),
            clock,
        }
    }

    /// The engine's root directory (absolute, forward slashes).
    pub fn root(&self) -> &str {
        &self.root
    }

    // ------------------------------------------------------------------
    // Working tree surface
    // ------------------------------------------------------------------

    /// Create or update a file. Identical content does not bump the
    /// version counter.
    pub fn write(&mut self, path: &str, content: impl Into<String>) {
        let abs = self.resolve_path(path);
        self.worktree.write(abs, content.into());
    }

    /// Remove a file. Removing an absent path is a silent no-op.
    pub fn delete(&mut self, path: &str) {
        let abs = self.resolve_path(path);
        self.worktree.remove(&abs);
    }

    /// Look up a file.
    pub fn read(&self, path: &str) -> Option<&FileEntry> {
        let abs = self.resolve_path(path);
        self.worktree.get(&abs)
    }

    /// Every live file, in path order.
    pub fn get_all_files(&self) -> Vec<&FileEntry> {
        self.worktree.iter().collect()
    }

    /// List names under a directory, sorted ascending.
    pub fn read_dir(&self, path: &str, options: ReadDirOptions) -> Vec<String> {
        let dir = self.resolve_path(path);
        let filter = if options.ignore {
            self.ignore_filter()
        } else {
            IgnoreFilter::empty()
        };

        self.worktree.read_dir(&dir, options.recursive, |abs| {
            filter.is_empty() || !filter.ignores(&self.rel_path(abs))
        })
    }

    // ------------------------------------------------------------------
    // History surface
    // ------------------------------------------------------------------

    /// Compare the filtered working tree against the `HEAD` tree.
    pub fn status(&self) -> Result<Status> {
        let working = self.working_manifest();
        let head = match self.head_commit() {
            Some(hash) => self.commit_manifest(&hash)?,
            None => BTreeMap::new(),
        };

        let mut status = Status::default();
        for (path, hash) in &working {
            match head.get(path) {
                None => status.new.push(path.clone()),
                Some(head_hash) if head_hash != hash => status.modified.push(path.clone()),
                Some(_) => {}
            }
        }
        for path in head.keys() {
            if !working.contains_key(path) {
                status.deleted.push(path.clone());
            }
        }

        Ok(status)
    }

    /// Commit the filtered working tree.
    ///
    /// `parents` overrides the default parent list (the current `HEAD`
    /// commit, or nothing on the first commit). Committing an unchanged
    /// tree is allowed and produces a new commit.
    pub fn commit(
        &mut self,
        message: &str,
        author: Option<&str>,
        parents: Option<Vec<String>>,
    ) -> Result<String> {
        let mut manifest = BTreeMap::new();
        for (rel, content) in self.filtered_files() {
            let object = Object::Blob(Blob::new(content));
            let hash = object.hash();
            self.store.put(hash.clone(), object);
            manifest.insert(rel, hash);
        }

        let tree_hash = build_tree(self.store.as_mut(), &manifest);

        let parents = match parents {
            Some(parents) => parents,
            None => self.head_commit().into_iter().collect(),
        };

        let commit = Commit::new(
            tree_hash,
            parents,
            message,
            author.unwrap_or(DEFAULT_AUTHOR),
            (self.clock)(),
        );
        let object = Object::Commit(commit);
        let hash = object.hash();
        self.store.put(hash.clone(), object);

        match self.head.clone() {
            Head::Symbolic(name) => self.refs.set(name, Some(hash.clone())),
            Head::Detached(_) => self.head = Head::Detached(hash.clone()),
        }

        tracing::debug!(commit = %hash, "committed working tree");
        Ok(hash)
    }

    /// Replace the working tree with a commit's tree and move `HEAD`.
    ///
    /// Uncommitted edits are destroyed without prompt.
    pub fn checkout(&mut self, hash_or_ref: &str) -> Result<()> {
        let resolved = self
            .resolve(hash_or_ref)
            .ok_or_else(|| VcsError::NotFound(format!("reference '{}'", hash_or_ref)))?;
        let commit = self.get_commit(&resolved)?;
        let manifest = flatten_tree(self.store.as_ref(), &commit.tree)?;

        self.worktree.clear();
        for (rel, blob_hash) in &manifest {
            let content = self.get_blob(blob_hash)?.content;
            let abs = self.resolve_path(rel);
            self.worktree.write(abs, content);
        }

        self.head = if self.refs.contains(hash_or_ref) {
            Head::Symbolic(hash_or_ref.to_string())
        } else {
            let full = format!("{}{}", HEADS_PREFIX, hash_or_ref);
            if self.refs.contains(&full) {
                Head::Symbolic(full)
            } else {
                Head::Detached(resolved.clone())
            }
        };

        tracing::debug!(target_commit = %resolved, "checked out");
        Ok(())
    }

    /// Create `refs/heads/<name>` at the current `HEAD` commit.
    pub fn create_branch(&mut self, name: &str) -> Result<()> {
        let full = format!("{}{}", HEADS_PREFIX, name);
        if self.refs.contains(&full) {
            return Err(VcsError::InvalidArgument(format!(
                "a branch named '{}' already exists",
                name
            )));
        }
        let current = self.head_commit().ok_or_else(|| {
            VcsError::State("cannot create a branch before the first commit".to_string())
        })?;
        self.refs.set(full, Some(current));
        Ok(())
    }

    /// Delete `refs/heads/<name>`.
    ///
    /// Fails when `HEAD` currently resolves through that ref. With a
    /// detached `HEAD` any branch may be deleted.
    pub fn delete_branch(&mut self, name: &str) -> Result<()> {
        let full = format!("{}{}", HEADS_PREFIX, name);
        if !self.refs.contains(&full) {
            return Err(VcsError::InvalidArgument(format!(
                "branch '{}' not found",
                name
            )));
        }
        if self.head.symbolic() == Some(full.as_str()) {
            return Err(VcsError::State(format!(
                "cannot delete branch '{}': it is checked out",
                name
            )));
        }
        self.refs.remove(&full);
        Ok(())
    }

    /// Merge a branch into the current `HEAD`.
    pub fn merge(&mut self, branch: &str) -> Result<MergeOutcome> {
        let theirs = self
            .resolve(branch)
            .ok_or_else(|| VcsError::NotFound(format!("branch '{}'", branch)))?;
        let ours = self
            .head_commit()
            .ok_or_else(|| VcsError::State("HEAD has no commits to merge into".to_string()))?;

        if ours == theirs {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let our_ancestors = ancestor_set(self.store.as_ref(), &ours)?;
        let base = merge_base(self.store.as_ref(), &theirs, &our_ancestors)?
            .ok_or(VcsError::UnrelatedHistories)?;

        if base == ours {
            self.checkout(&theirs)?;
            tracing::debug!(from = %ours, to = %theirs, "fast-forwarded");
            return Ok(MergeOutcome::FastForward);
        }
        if base == theirs {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let base_manifest = self.commit_manifest(&base)?;
        let ours_manifest = self.commit_manifest(&ours)?;
        let theirs_manifest = self.commit_manifest(&theirs)?;

        // Resolve the whole union first; the working tree is only touched
        // once no path has conflicted.
        let changes = resolve_three_way(&base_manifest, &ours_manifest, &theirs_manifest)?;

        for change in changes {
            match change {
                Change::Write { path, hash } => {
                    let content = self.get_blob(&hash)?.content;
                    let abs = self.resolve_path(&path);
                    self.worktree.write(abs, content);
                }
                Change::Delete { path } => {
                    let abs = self.resolve_path(&path);
                    self.worktree.remove(&abs);
                }
            }
        }

        let message = format!("Merge branch '{}'", branch);
        let hash = self.commit(&message, None, Some(vec![ours, theirs]))?;
        tracing::debug!(merge_commit = %hash, "merged");
        Ok(MergeOutcome::Merged(hash))
    }

    /// Every commit reachable from `HEAD`, breadth-first, `HEAD` first.
    pub fn log(&self) -> Result<Vec<LogEntry>> {
        let Some(start) = self.head_commit() else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back(start);

        while let Some(hash) = queue.pop_front() {
            let commit = self.get_commit(&hash)?;
            for parent in &commit.parents {
                if visited.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
            entries.push(LogEntry { hash, commit });
        }

        Ok(entries)
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Write the full engine state to a host file as pretty-printed JSON.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        snapshot::save(self, path.as_ref())
    }

    /// Restore the full engine state from a snapshot file.
    ///
    /// The document is parsed and validated in full (including object hash
    /// recomputation) before any engine state changes; on error the prior
    /// state is intact.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        snapshot::load(self, path.as_ref())
    }

    /// The store, refs, and `HEAD`, for inspection and tests.
    pub fn database_dump(&self) -> DatabaseDump {
        let mut objects = self.store.dump();
        objects.sort_by(|a, b| a.0.cmp(&b.0));
        let refs = self
            .refs
            .iter()
            .map(|(name, value)| (name.clone(), value.clone().unwrap_or_default()))
            .collect();
        DatabaseDump {
            objects,
            refs,
            head: self.head.as_str().to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Resolve a hash or ref name to a commit hash.
    ///
    /// Order: exact object hash, full ref name, short branch name.
    pub fn resolve(&self, hash_or_ref: &str) -> Option<String> {
        if self.store.get(hash_or_ref).is_some() {
            return Some(hash_or_ref.to_string());
        }
        if let Some(hash) = self.refs.value(hash_or_ref) {
            return Some(hash.to_string());
        }
        let full = format!("{}{}", HEADS_PREFIX, hash_or_ref);
        self.refs.value(&full).map(str::to_string)
    }

    /// The commit `HEAD` currently points at, if any.
    pub fn head_commit(&self) -> Option<String> {
        match &self.head {
            Head::Symbolic(name) => self.refs.value(name).map(str::to_string),
            Head::Detached(hash) => Some(hash.clone()),
        }
    }

    /// Whether `HEAD` is detached.
    pub fn is_detached(&self) -> bool {
        self.head.is_detached()
    }

    fn get_commit(&self, hash: &str) -> Result<Commit> {
        let object = self
            .store
            .get(hash)
            .ok_or_else(|| VcsError::NotFound(format!("commit {}", hash)))?;
        match object {
            Object::Commit(commit) => Ok(commit),
            other => Err(VcsError::InvalidArgument(format!(
                "object {} is a {}, not a commit",
                hash,
                other.kind()
            ))),
        }
    }

    fn get_blob(&self, hash: &str) -> Result<Blob> {
        let object = self
            .store
            .get(hash)
            .ok_or_else(|| VcsError::NotFound(format!("blob {}", hash)))?;
        match object {
            Object::Blob(blob) => Ok(blob),
            other => Err(VcsError::InvalidArgument(format!(
                "object {} is a {}, not a blob",
                hash,
                other.kind()
            ))),
        }
    }

    /// Flatten the tree of the given commit to `relative path -> blob hash`.
    fn commit_manifest(&self, commit_hash: &str) -> Result<BTreeMap<String, String>> {
        let commit = self.get_commit(commit_hash)?;
        flatten_tree(self.store.as_ref(), &commit.tree)
    }

    /// The filtered working tree as `relative path -> blob hash`, without
    /// storing anything.
    fn working_manifest(&self) -> BTreeMap<String, String> {
        self.filtered_files()
            .into_iter()
            .map(|(rel, content)| (rel, Blob::new(content).hash()))
            .collect()
    }

    /// The filtered working tree as `(relative path, content)` pairs.
    fn filtered_files(&self) -> Vec<(String, String)> {
        let filter = self.ignore_filter();
        self.worktree
            .iter()
            .filter_map(|entry| {
                let rel = self.rel_path(&entry.path);
                if !filter.is_empty() && filter.ignores(&rel) {
                    None
                } else {
                    Some((rel, entry.content.clone()))
                }
            })
            .collect()
    }

    /// The ignore filter from the working tree's root `.gitignore`, or an
    /// empty filter when there is none.
    fn ignore_filter(&self) -> IgnoreFilter {
        let abs = self.resolve_path(GITIGNORE);
        match self.worktree.get(&abs) {
            Some(entry) => IgnoreFilter::parse(&entry.content),
            None => IgnoreFilter::empty(),
        }
    }

    /// Normalize a caller path to an absolute path under the root.
    pub(crate) fn resolve_path(&self, path: &str) -> String {
        let path = path.replace('\\', "/");
        let joined = if is_under(&self.root, &path) {
            path
        } else {
            format!(
                "{}/{}",
                self.root.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in joined.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        format!("/{}", segments.join("/"))
    }

    /// An absolute path's form relative to the root (no leading slash).
    pub(crate) fn rel_path(&self, abs: &str) -> String {
        abs.strip_prefix(&self.root)
            .unwrap_or(abs)
            .trim_start_matches('/')
            .to_string()
    }
}

fn normalize_root(root: String) -> String {
    let root = root.replace('\\', "/");
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Whether `path` is `root` itself or lies underneath it.
fn is_under(root: &str, path: &str) -> bool {
    if root == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(root) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_engine() -> Engine {
        Engine::with_clock("/", Box::new(|| 1_700_000_000_000))
    }

    fn messages(log: &[LogEntry]) -> Vec<&str> {
        log.iter().map(|entry| entry.commit.message.as_str()).collect()
    }

    #[test]
    fn test_write_read_delete() {
        let mut engine = fixed_engine();
        engine.write("src/main.ts", "body");
        assert_eq!(engine.read("src/main.ts").unwrap().content, "body");
        assert_eq!(engine.read("/src/main.ts").unwrap().content, "body");

        engine.delete("src/main.ts");
        assert!(engine.read("src/main.ts").is_none());

        // Deleting an absent path is a silent no-op.
        engine.delete("never-existed.ts");
    }

    #[test]
    fn test_version_counter_only_moves_on_change() {
        let mut engine = fixed_engine();
        engine.write("a.ts", "one");
        engine.write("a.ts", "one");
        assert_eq!(engine.read("a.ts").unwrap().version, 0);
        engine.write("a.ts", "two");
        assert_eq!(engine.read("a.ts").unwrap().version, 1);
    }

    #[test]
    fn test_read_dir_shapes() {
        let mut engine = fixed_engine();
        engine.write("src/a.ts", "");
        engine.write("src/util/b.ts", "");
        engine.write("readme.md", "");

        let flat = engine.read_dir("/", ReadDirOptions::default());
        assert_eq!(flat, vec!["readme.md", "src"]);

        let deep = engine.read_dir("/", ReadDirOptions { recursive: true, ignore: false });
        assert_eq!(deep, vec!["readme.md", "src/a.ts", "src/util/b.ts"]);
    }

    #[test]
    fn test_read_dir_respects_gitignore() {
        let mut engine = fixed_engine();
        engine.write(".gitignore", "*.log\n");
        engine.write("debug.log", "x");
        engine.write("main.ts", "x");

        let names = engine.read_dir("/", ReadDirOptions { recursive: true, ignore: true });
        assert_eq!(names, vec![".gitignore", "main.ts"]);

        // Without the flag the log file is listed.
        let names = engine.read_dir("/", ReadDirOptions { recursive: true, ignore: false });
        assert!(names.contains(&"debug.log".to_string()));
    }

    #[test]
    fn test_commit_excludes_ignored_files() {
        let mut engine = fixed_engine();
        engine.write(".gitignore", "*.log\n");
        engine.write("debug.log", "noise");
        engine.write("src/a.ts", "code");
        let hash = engine.commit("c1", None, None).unwrap();

        let manifest = engine.commit_manifest(&hash).unwrap();
        assert!(manifest.contains_key(".gitignore"));
        assert!(manifest.contains_key("src/a.ts"));
        assert!(!manifest.contains_key("debug.log"));
    }

    #[test]
    fn test_first_commit_sets_main() {
        let mut engine = fixed_engine();
        assert_eq!(engine.head_commit(), None);

        engine.write("a.txt", "A");
        let hash = engine.commit("c1", None, None).unwrap();

        let entry = engine.log().unwrap();
        assert!(entry[0].commit.is_initial());
        assert_eq!(entry[0].hash, hash);
        assert_eq!(engine.head_commit(), Some(hash));
        assert!(!engine.is_detached());
    }

    #[test]
    fn test_commit_checkout_round_trip() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "first");
        let c1 = engine.commit("c1", None, None).unwrap();
        engine.write("a.txt", "second");
        let c2 = engine.commit("c2", None, None).unwrap();

        engine.checkout(&c1).unwrap();
        assert_eq!(engine.read("a.txt").unwrap().content, "first");
        assert!(engine.is_detached());

        engine.checkout(&c2).unwrap();
        assert_eq!(engine.read("a.txt").unwrap().content, "second");
        // Checkout rebuilds entries from scratch.
        assert_eq!(engine.read("a.txt").unwrap().version, 0);
    }

    #[test]
    fn test_checkout_destroys_uncommitted_edits() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "committed");
        engine.commit("c1", None, None).unwrap();
        engine.write("a.txt", "scratch");
        engine.write("extra.txt", "scratch");

        engine.checkout("main").unwrap();
        assert_eq!(engine.read("a.txt").unwrap().content, "committed");
        assert!(engine.read("extra.txt").is_none());
    }

    #[test]
    fn test_checkout_non_commit_is_invalid() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        let c1 = engine.commit("c1", None, None).unwrap();
        let tree_hash = engine.get_commit(&c1).unwrap().tree;

        let err = engine.checkout(&tree_hash).unwrap_err();
        assert!(matches!(err, VcsError::InvalidArgument(_)));

        let err = engine.checkout("no-such-branch").unwrap_err();
        assert!(matches!(err, VcsError::NotFound(_)));
    }

    #[test]
    fn test_empty_commit_reuses_parent_tree() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        let c1 = engine.commit("c1", None, None).unwrap();
        let c2 = engine.commit("c2", None, None).unwrap();

        assert_ne!(c1, c2);
        let log = engine.log().unwrap();
        assert_eq!(log[0].commit.tree, log[1].commit.tree);
        assert_eq!(log[0].commit.parents, vec![c1]);
    }

    #[test]
    fn test_commit_while_detached_advances_head_only() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        let c1 = engine.commit("c1", None, None).unwrap();
        engine.checkout(&c1).unwrap();

        engine.write("b.txt", "B");
        let c2 = engine.commit("detached work", None, None).unwrap();

        assert_eq!(engine.head_commit(), Some(c2));
        assert!(engine.is_detached());
        // main still points at the first commit.
        assert_eq!(engine.refs.value("refs/heads/main"), Some(c1.as_str()));
    }

    #[test]
    fn test_branch_create_duplicate_and_missing() {
        let mut engine = fixed_engine();
        let err = engine.create_branch("feat").unwrap_err();
        assert!(matches!(err, VcsError::State(_)));

        engine.write("a.txt", "A");
        engine.commit("c1", None, None).unwrap();
        engine.create_branch("feat").unwrap();

        let err = engine.create_branch("feat").unwrap_err();
        assert!(matches!(err, VcsError::InvalidArgument(_)));

        let err = engine.delete_branch("ghost").unwrap_err();
        assert!(matches!(err, VcsError::InvalidArgument(_)));
    }

    #[test]
    fn test_delete_checked_out_branch_fails() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "1");
        engine.commit("c1", None, None).unwrap();

        let err = engine.delete_branch("main").unwrap_err();
        assert!(matches!(err, VcsError::State(_)));
        assert!(engine.refs.contains("refs/heads/main"));
    }

    #[test]
    fn test_delete_branch_while_detached_succeeds() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "1");
        let c1 = engine.commit("c1", None, None).unwrap();
        engine.write("a.txt", "2");
        engine.commit("c2", None, None).unwrap();

        engine.checkout(&c1).unwrap();
        assert!(engine.is_detached());
        engine.delete_branch("main").unwrap();
        assert!(!engine.refs.contains("refs/heads/main"));
    }

    // Scenario: fast-forward merge.
    #[test]
    fn test_fast_forward_merge() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        engine.commit("c1", None, None).unwrap();
        assert_eq!(messages(&engine.log().unwrap()), vec!["c1"]);

        engine.create_branch("feat").unwrap();
        engine.checkout("feat").unwrap();
        engine.write("b.txt", "B");
        engine.commit("c2", None, None).unwrap();
        assert_eq!(messages(&engine.log().unwrap()), vec!["c2", "c1"]);

        engine.checkout("main").unwrap();
        assert!(engine.read("b.txt").is_none());

        let outcome = engine.merge("feat").unwrap();
        assert_eq!(outcome, MergeOutcome::FastForward);
        assert_eq!(outcome.to_string(), "Fast-forward");
        assert_eq!(engine.read("b.txt").unwrap().content, "B");
        assert_eq!(messages(&engine.log().unwrap()), vec!["c2", "c1"]);
    }

    // Scenario: three-way merge without conflicts.
    #[test]
    fn test_three_way_merge() {
        let mut engine = fixed_engine();
        engine.write("base.txt", "base");
        engine.commit("init", None, None).unwrap();

        engine.create_branch("feat").unwrap();
        engine.checkout("feat").unwrap();
        engine.write("feat.txt", "feat");
        engine.commit("fc", None, None).unwrap();

        engine.checkout("main").unwrap();
        engine.write("main.txt", "main");
        engine.commit("mc", None, None).unwrap();

        let outcome = engine.merge("feat").unwrap();
        assert_eq!(outcome.to_string(), "Merge successful");

        assert_eq!(engine.read("base.txt").unwrap().content, "base");
        assert_eq!(engine.read("feat.txt").unwrap().content, "feat");
        assert_eq!(engine.read("main.txt").unwrap().content, "main");

        let log = engine.log().unwrap();
        assert_eq!(log[0].commit.parents.len(), 2);
        assert_eq!(log[0].commit.message, "Merge branch 'feat'");
        // The merge advanced the current branch.
        assert_eq!(engine.refs.value("refs/heads/main"), Some(log[0].hash.as_str()));
    }

    // Scenario: conflicting edits on both sides.
    #[test]
    fn test_merge_conflict_names_path_and_leaves_tree_alone() {
        let mut engine = fixed_engine();
        engine.write("x", "0");
        engine.commit("c0", None, None).unwrap();

        engine.create_branch("b").unwrap();
        engine.checkout("b").unwrap();
        engine.write("x", "B");
        engine.commit("cb", None, None).unwrap();

        engine.checkout("main").unwrap();
        engine.write("x", "M");
        engine.commit("cm", None, None).unwrap();

        let log_before = engine.log().unwrap().len();
        let err = engine.merge("b").unwrap_err();
        match err {
            VcsError::Conflict { path } => assert_eq!(path, "x"),
            other => panic!("expected conflict, got {:?}", other),
        }

        // Changes are staged before application, so the working tree and
        // the history are untouched.
        assert_eq!(engine.read("x").unwrap().content, "M");
        assert_eq!(engine.log().unwrap().len(), log_before);
    }

    #[test]
    fn test_merge_equal_heads_is_up_to_date() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        engine.commit("c1", None, None).unwrap();
        engine.create_branch("feat").unwrap();

        let log_before = engine.log().unwrap().len();
        let outcome = engine.merge("feat").unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
        assert_eq!(outcome.to_string(), "Already up to date");
        assert_eq!(engine.log().unwrap().len(), log_before);
    }

    #[test]
    fn test_merge_ancestor_branch_is_up_to_date() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        engine.commit("c1", None, None).unwrap();
        engine.create_branch("old").unwrap();
        engine.write("a.txt", "A2");
        engine.commit("c2", None, None).unwrap();

        let outcome = engine.merge("old").unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
    }

    #[test]
    fn test_merge_unrelated_histories_fails() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        let on_main = engine.commit("on main", None, None).unwrap();

        // A second root commit with no parents, created on a detached HEAD
        // so main stays put.
        engine.checkout(&on_main).unwrap();
        engine.write("b.txt", "B");
        let orphan = engine.commit("orphan", None, Some(vec![])).unwrap();
        engine.refs.set("refs/heads/orphan".to_string(), Some(orphan));
        engine.checkout("main").unwrap();

        let err = engine.merge("orphan").unwrap_err();
        assert!(matches!(err, VcsError::UnrelatedHistories));
    }

    // Scenario: status taxonomy.
    #[test]
    fn test_status_taxonomy() {
        let mut engine = fixed_engine();
        engine.write("a", "1");
        engine.commit("c1", None, None).unwrap();

        engine.write("a", "1'");
        engine.write("b", "2");
        engine.delete("missing");

        let status = engine.status().unwrap();
        assert_eq!(status.modified, vec!["a"]);
        assert_eq!(status.new, vec!["b"]);
        assert!(status.deleted.is_empty());
    }

    #[test]
    fn test_status_deleted_and_clean() {
        let mut engine = fixed_engine();
        engine.write("a", "1");
        engine.write("b", "2");
        engine.commit("c1", None, None).unwrap();

        assert_eq!(engine.status().unwrap(), Status::default());

        engine.delete("b");
        let status = engine.status().unwrap();
        assert_eq!(status.deleted, vec!["b"]);
        assert!(status.new.is_empty());
        assert!(status.modified.is_empty());
    }

    #[test]
    fn test_status_before_first_commit_is_all_new() {
        let mut engine = fixed_engine();
        engine.write("a", "1");
        let status = engine.status().unwrap();
        assert_eq!(status.new, vec!["a"]);
        assert!(status.modified.is_empty() && status.deleted.is_empty());
    }

    #[test]
    fn test_status_ignores_filtered_files() {
        let mut engine = fixed_engine();
        engine.write(".gitignore", "*.log\n");
        engine.commit("c1", None, None).unwrap();
        engine.write("noise.log", "x");

        let status = engine.status().unwrap();
        assert!(status.new.is_empty());
    }

    #[test]
    fn test_resolution_order() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        let c1 = engine.commit("c1", None, None).unwrap();

        // Exact hash, full ref name, then short branch name.
        assert_eq!(engine.resolve(&c1), Some(c1.clone()));
        assert_eq!(engine.resolve("refs/heads/main"), Some(c1.clone()));
        assert_eq!(engine.resolve("main"), Some(c1));
        assert_eq!(engine.resolve("nope"), None);
    }

    #[test]
    fn test_checkout_sets_symbolic_head_for_names() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        engine.commit("c1", None, None).unwrap();
        engine.create_branch("feat").unwrap();

        engine.checkout("refs/heads/feat").unwrap();
        assert_eq!(engine.head.symbolic(), Some("refs/heads/feat"));

        engine.checkout("main").unwrap();
        assert_eq!(engine.head.symbolic(), Some("refs/heads/main"));
    }

    // Property: the committed root tree depends only on the final mapping,
    // not on operation order.
    #[test]
    fn test_commit_tree_independent_of_operation_order() {
        let mut first = fixed_engine();
        first.write("a.txt", "A");
        first.write("b.txt", "B");
        first.write("tmp.txt", "T");
        first.delete("tmp.txt");
        first.commit("snap", None, None).unwrap();

        let mut second = fixed_engine();
        second.write("b.txt", "stale");
        second.write("b.txt", "B");
        second.write("a.txt", "A");
        second.commit("snap", None, None).unwrap();

        let first_tree = &first.log().unwrap()[0].commit.tree;
        let second_tree = &second.log().unwrap()[0].commit.tree;
        assert_eq!(first_tree, second_tree);
    }

    // Invariant: everything in the dump hashes to its key, and commit
    // references resolve.
    #[test]
    fn test_store_invariants_after_merge() {
        let mut engine = fixed_engine();
        engine.write("base.txt", "base");
        engine.commit("init", None, None).unwrap();
        engine.create_branch("feat").unwrap();
        engine.checkout("feat").unwrap();
        engine.write("feat.txt", "feat");
        engine.commit("fc", None, None).unwrap();
        engine.checkout("main").unwrap();
        engine.write("main.txt", "main");
        engine.commit("mc", None, None).unwrap();
        engine.merge("feat").unwrap();

        let dump = engine.database_dump();
        for (hash, object) in &dump.objects {
            assert_eq!(&object.hash(), hash);
            if let Object::Commit(commit) = object {
                assert!(dump.objects.iter().any(|(h, _)| h == &commit.tree));
                for parent in &commit.parents {
                    assert!(dump.objects.iter().any(|(h, _)| h == parent));
                }
            }
        }
    }

    #[test]
    fn test_default_author_and_explicit_author() {
        let mut engine = fixed_engine();
        engine.write("a.txt", "A");
        engine.commit("c1", None, None).unwrap();
        engine.commit("c2", Some("agent-7"), None).unwrap();

        let log = engine.log().unwrap();
        assert_eq!(log[0].commit.author, "agent-7");
        assert_eq!(log[1].commit.author, DEFAULT_AUTHOR);
        assert_eq!(log[0].commit.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_nested_root_path_handling() {
        let mut engine = Engine::with_clock("/project", Box::new(|| 0));
        engine.write("src/main.ts", "x");
        assert!(engine.read("/project/src/main.ts").is_some());
        assert_eq!(engine.get_all_files()[0].path, "/project/src/main.ts");

        let hash = engine.commit("c", None, None).unwrap();
        let manifest = engine.commit_manifest(&hash).unwrap();
        assert!(manifest.contains_key("src/main.ts"));
    }
}
