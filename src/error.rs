//! # Error Types
//!
//! Every fallible core operation returns [`VcsError`]. The variants map
//! one-to-one onto the failure classes of the engine:
//!
//! - `NotFound` - a hash, branch, or path does not exist
//! - `InvalidArgument` - a malformed or ill-typed argument (e.g. checking
//!   out something that is not a commit)
//! - `State` - the operation is valid but the engine is in the wrong state
//!   for it (e.g. deleting the checked-out branch)
//! - `Conflict` - a three-way merge could not auto-resolve a path
//! - `UnrelatedHistories` - two commits share no common ancestor
//! - `Corruption` - a stored object's recomputed hash differs from its key
//! - `Io` / `Json` - snapshot I/O and parse failures, surfaced verbatim
//!
//! Errors propagate to the caller without logging. The only swallowed
//! conditions are individual ignore-pattern compile failures (warned once,
//! pattern dropped) and deleting an absent working-tree path.

use thiserror::Error;

/// Errors produced by the version control core.
#[derive(Debug, Error)]
pub enum VcsError {
    /// A referenced hash, branch, or path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An argument was malformed or of the wrong kind.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine is in the wrong state for the requested operation.
    #[error("{0}")]
    State(String),

    /// A three-way merge diverged on the named path.
    #[error("merge conflict in '{path}'")]
    Conflict {
        /// Repository-relative path that could not be auto-resolved.
        path: String,
    },

    /// The commits being merged share no common ancestor.
    #[error("refusing to merge unrelated histories")]
    UnrelatedHistories,

    /// A stored object's content does not hash to its key.
    #[error("corrupt object {hash}: content hashes to {actual}")]
    Corruption {
        /// The key the object was stored under.
        hash: String,
        /// The hash recomputed from the stored content.
        actual: String,
    },

    /// Snapshot file I/O failed.
    #[error("snapshot I/O failed")]
    Io(#[from] std::io::Error),

    /// Snapshot document could not be parsed or serialized.
    #[error("snapshot parse failed")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, VcsError>;
