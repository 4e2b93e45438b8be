//! # Blob Object
//!
//! A blob stores one file's contents - no name, no metadata, just the text.
//! Identical contents always produce the same blob hash, so the store holds
//! one blob per unique content no matter how many paths share it.

use serde::{Deserialize, Serialize};

use crate::objects::hash_content;

/// Represents a blob object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    /// The file content.
    pub content: String,
}

impl Blob {
    /// Create a new blob.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Compute the SHA-1 hash of this blob.
    pub fn hash(&self) -> String {
        hash_content("blob", self.content.as_bytes())
    }
}
