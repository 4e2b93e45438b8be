//! # Tree Object
//!
//! A tree represents a directory: an ordered list of entries, one per child
//! file (blob) or subdirectory (tree).
//!
//! ## Serialized Format
//!
//! One line per entry, joined by `\n` with no trailing newline:
//!
//! ```text
//! <mode> <kind> <hex-hash> <name>
//! ```
//!
//! Entries are sorted ascending by `name` (plain lexicographic order on the
//! raw name string) and names within one tree are unique. Both properties
//! are invariants of every stored tree.
//!
//! ## Modes
//!
//! Only two modes exist in this system:
//!
//! - `100644` - regular file (blob entry)
//! - `040000` - directory (tree entry)

use serde::{Deserialize, Serialize};

use crate::objects::hash_content;

/// File mode for a regular file.
pub const MODE_FILE: &str = "100644";
/// File mode for a directory (tree).
pub const MODE_DIR: &str = "040000";

/// Whether a tree entry points at a blob or a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
}

impl EntryKind {
    /// The tag string used in tree serialization.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Tree => "tree",
        }
    }
}

/// A single entry in a tree object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// File mode (`"100644"` or `"040000"`).
    pub mode: String,
    /// Blob or tree.
    pub kind: EntryKind,
    /// SHA-1 hash of the referenced object (40 hex chars).
    pub hash: String,
    /// Entry name (a single path segment, not a full path).
    pub name: String,
}

impl TreeEntry {
    /// Create a tree entry for a regular file.
    pub fn file(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            mode: MODE_FILE.to_string(),
            kind: EntryKind::Blob,
            hash: hash.into(),
            name: name.into(),
        }
    }

    /// Create a tree entry for a subdirectory.
    pub fn directory(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            mode: MODE_DIR.to_string(),
            kind: EntryKind::Tree,
            hash: hash.into(),
            name: name.into(),
        }
    }

    /// Serialize this entry to its line form.
    fn serialize(&self) -> String {
        format!("{} {} {} {}", self.mode, self.kind.as_str(), self.hash, self.name)
    }
}

/// Represents a tree object (directory node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// The entries in this tree, sorted ascending by name.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Add an entry. Call [`Tree::sort`] before hashing or storing.
    pub fn add_entry(&mut self, entry: TreeEntry) {
        self.entries.push(entry);
    }

    /// Sort entries ascending by name.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Look up an entry by name.
    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Serialize the tree to its canonical hashable form.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(TreeEntry::serialize)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Compute the SHA-1 hash of this tree.
    pub fn hash(&self) -> String {
        hash_content("tree", self.serialize().as_bytes())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
