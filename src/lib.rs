//! # Verfs - An In-Memory, Content-Addressed Version Control Core
//!
//! Verfs versions source trees for programmatic agents: code generators
//! write files, commit them with branch and merge semantics, hand the tree
//! to an external compiler, and execute the output in a container sandbox.
//! Nothing touches the host filesystem except snapshots and the sandbox.
//!
//! ## Architecture Overview
//!
//! Everything is built on a content-addressable object database. Every
//! piece of history is an immutable object identified by its SHA-1 hash:
//!
//! - **Blob**: one file's contents
//! - **Tree**: a directory listing (sorted name-to-hash entries)
//! - **Commit**: a tree hash plus parents, author, timestamp, and message
//!
//! Five layers cooperate, bottom up:
//!
//! ```text
//! engine        orchestrator: write/commit/checkout/merge/log/snapshots
//!   ├── worktree    mutable live files (path -> content + version)
//!   ├── ignore      .gitignore-style filter over enumeration
//!   ├── refs        branch table + HEAD (symbolic or detached)
//!   └── store       content-addressed object database (in-memory default)
//! ```
//!
//! The compiler and sandbox collaborators sit outside the core and reach
//! it only through the engine's public surface ([`compiler::CompilerHost`],
//! [`sandbox::run`]).
//!
//! ## Usage Example
//!
//! ```
//! use verfs::Engine;
//!
//! let mut engine = Engine::new("/");
//! engine.write("main.ts", "export const x = 1;");
//! engine.commit("initial", None, None)?;
//!
//! engine.create_branch("feature")?;
//! engine.checkout("feature")?;
//! engine.write("feature.ts", "export const y = 2;");
//! engine.commit("add feature", None, None)?;
//!
//! engine.checkout("main")?;
//! engine.merge("feature")?;
//! assert!(engine.read("feature.ts").is_some());
//! # assert_eq!(engine.log()?.len(), 2);
//! # Ok::<(), verfs::VcsError>(())
//! ```

pub mod compiler;
pub mod engine;
pub mod error;
pub mod ignore;
pub mod merge;
pub mod objects;
pub mod refs;
pub mod sandbox;
pub mod snapshot;
pub mod store;
pub mod tree_builder;
pub mod worktree;

pub use engine::{Clock, DatabaseDump, Engine, LogEntry, ReadDirOptions, Status, DEFAULT_AUTHOR};
pub use error::{Result, VcsError};
pub use merge::MergeOutcome;
pub use objects::Object;
pub use store::{MemoryObjectStore, ObjectStore};
pub use worktree::{FileContext, FileEntry, Language};
