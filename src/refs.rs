//! # References and HEAD
//!
//! Branches are rows in a [`RefTable`]: a symbolic name such as
//! `refs/heads/main` mapped to a commit hash. A ref that exists but has no
//! commit yet (a freshly initialized `main`) holds `None`.
//!
//! `HEAD` is a separate cell: either symbolic (the name of a ref, the normal
//! case) or detached (a raw commit hash).

use std::collections::BTreeMap;

/// The default branch ref, present from construction.
pub const MAIN_REF: &str = "refs/heads/main";

/// Prefix under which branch names live.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// True for a 40-char lowercase-hex object hash.
pub fn is_hash(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Map from symbolic ref name to commit hash.
///
/// `None` means the ref exists but points at no commit yet.
#[derive(Debug, Clone)]
pub struct RefTable {
    refs: BTreeMap<String, Option<String>>,
}

impl RefTable {
    /// A fresh table containing `refs/heads/main` with no commit.
    pub fn new() -> Self {
        let mut refs = BTreeMap::new();
        refs.insert(MAIN_REF.to_string(), None);
        Self { refs }
    }

    /// Whether a ref with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.refs.contains_key(name)
    }

    /// The commit a ref points at, if the ref exists and has one.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.refs.get(name).and_then(|v| v.as_deref())
    }

    /// Create or update a ref.
    pub fn set(&mut self, name: String, hash: Option<String>) {
        self.refs.insert(name, hash);
    }

    /// Remove a ref. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.refs.remove(name).is_some()
    }

    /// Iterate `(name, hash)` rows in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<String>)> {
        self.refs.iter()
    }

    /// Replace the whole table.
    pub fn replace(&mut self, refs: BTreeMap<String, Option<String>>) {
        self.refs = refs;
    }
}

impl Default for RefTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The current position in the commit graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// `HEAD` names a ref in the table.
    Symbolic(String),
    /// `HEAD` is a raw commit hash.
    Detached(String),
}

impl Head {
    /// Parse the wire form: a 40-hex hash is detached, anything else is a
    /// ref name.
    pub fn parse(s: &str) -> Self {
        if is_hash(s) {
            Head::Detached(s.to_string())
        } else {
            Head::Symbolic(s.to_string())
        }
    }

    /// The wire form: the ref name, or the raw hash when detached.
    pub fn as_str(&self) -> &str {
        match self {
            Head::Symbolic(value) | Head::Detached(value) => value,
        }
    }

    /// The ref name when symbolic.
    pub fn symbolic(&self) -> Option<&str> {
        match self {
            Head::Symbolic(name) => Some(name),
            Head::Detached(_) => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }
}

impl Default for Head {
    fn default() -> Self {
        Head::Symbolic(MAIN_REF.to_string())
    }
}
