//! # Object Model
//!
//! Everything the engine versions is stored as an immutable, content-addressed
//! object. An object's identity is the SHA-1 hash of its serialized form with
//! a self-describing header:
//!
//! ```text
//! <type> <byte-length-of-serialized-content>\0<serialized-content>
//! ```
//!
//! ## Object Types
//!
//! - **Blob**: raw file contents, one per unique content
//! - **Tree**: a directory node - sorted `(mode, kind, hash, name)` entries
//! - **Commit**: a history node - tree hash, parent hashes, author, message
//!
//! Objects reference each other by hash only. There are no object-to-object
//! pointers anywhere in the crate: the store owns each object exactly once
//! and every edge in the commit graph is a 40-char hex value.
//!
//! The three variants form a tagged union ([`Object`]) so the snapshot
//! serializer and the store can dispatch on the tag. The same tag string
//! (`"blob"` / `"tree"` / `"commit"`) is used in the hash header and in the
//! snapshot JSON.

pub mod blob;
pub mod commit;
pub mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use tree::{EntryKind, Tree, TreeEntry};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Compute the SHA-1 hash of serialized content with its object header.
///
/// # Example
///
/// ```
/// use verfs::objects::hash_content;
///
/// let hash = hash_content("blob", b"Hello, World!");
/// assert_eq!(hash.len(), 40);
/// ```
pub fn hash_content(object_type: &str, content: &[u8]) -> String {
    let header = format!("{} {}\0", object_type, content.len());

    let mut hasher = Sha1::new();
    hasher.update(header.as_bytes());
    hasher.update(content);

    hex::encode(hasher.finalize())
}

/// A stored object: blob, tree, or commit.
///
/// Serialized to JSON as an internally tagged union, e.g.
/// `{"type":"blob","content":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// The type tag used in the hash header and the snapshot document.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Blob(_) => "blob",
            Object::Tree(_) => "tree",
            Object::Commit(_) => "commit",
        }
    }

    /// Serialize to the canonical hashable form.
    ///
    /// The byte layout is normative: changing it changes every hash in every
    /// repository.
    pub fn serialize(&self) -> String {
        match self {
            Object::Blob(blob) => blob.content.clone(),
            Object::Tree(tree) => tree.serialize(),
            Object::Commit(commit) => commit.serialize(),
        }
    }

    /// Compute this object's content hash.
    pub fn hash(&self) -> String {
        hash_content(self.kind(), self.serialize().as_bytes())
    }
}
