//! # Commit Object
//!
//! A commit pins one tree and links it into history through zero or more
//! parent commits.
//!
//! ## Serialized Format
//!
//! Lines joined by `\n`, no trailing newline:
//!
//! ```text
//! tree <tree-hash>
//! parent <parent-hash>     # one line per parent, in declared order
//! author <author> <timestamp-ms>
//! committer <author> <timestamp-ms>
//!
//! <commit message>
//! ```
//!
//! The committer always equals the author in this system, and timestamps are
//! milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};

use crate::objects::hash_content;

/// Represents a commit object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// SHA-1 hash of the root tree.
    pub tree: String,
    /// Parent commit hashes: 0 for the initial commit, 1 for a normal
    /// commit, 2 or more for a merge.
    pub parents: Vec<String>,
    /// The commit message, verbatim.
    pub message: String,
    /// The author string.
    pub author: String,
    /// Author timestamp in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Commit {
    /// Create a new commit.
    pub fn new(
        tree: impl Into<String>,
        parents: Vec<String>,
        message: impl Into<String>,
        author: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            tree: tree.into(),
            parents,
            message: message.into(),
            author: author.into(),
            timestamp,
        }
    }

    /// Serialize the commit to its canonical hashable form.
    pub fn serialize(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("tree {}", self.tree));

        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }

        lines.push(format!("author {} {}", self.author, self.timestamp));
        lines.push(format!("committer {} {}", self.author, self.timestamp));
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }

    /// Compute the SHA-1 hash of this commit.
    pub fn hash(&self) -> String {
        hash_content("commit", self.serialize().as_bytes())
    }

    /// Check if this is the initial commit (no parents).
    pub fn is_initial(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (2+ parents).
    pub fn is_merge(&self) -> bool {
        self.parents.len() >= 2
    }
}
