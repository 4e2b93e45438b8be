//! # Working Tree
//!
//! The mutable live file set, keyed by absolute path. Files are born on
//! `write`, updated in place (bumping a monotonic version counter only when
//! the content actually changes), and die on `remove` or when a checkout
//! clears the tree.
//!
//! Each file also carries derived, advisory context: a detected language
//! and the module specifiers it imports and exports. The context is
//! recomputed from content alone on every change and never participates in
//! hashing - an external compiler is free to ignore it and parse for
//! itself.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Source language detected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Json,
    Markdown,
    Css,
    Html,
}

impl Language {
    /// Detect a language from a path's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?;
        match ext {
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "js" | "mjs" | "cjs" => Some(Language::JavaScript),
            "jsx" => Some(Language::Jsx),
            "json" => Some(Language::Json),
            "md" => Some(Language::Markdown),
            "css" => Some(Language::Css),
            "html" | "htm" => Some(Language::Html),
            _ => None,
        }
    }
}

static IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s+[^'";]*?\bfrom\s+['"]([^'"]+)['"]"#).unwrap()
});
static IMPORT_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*import\s+['"]([^'"]+)['"]"#).unwrap());
static REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());
static EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*export\s+(?:async\s+)?(?:const|let|var|function\*?|class|interface|type|enum)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .unwrap()
});
static EXPORT_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s*\{([^}]*)\}").unwrap());
static EXPORT_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s+default\b").unwrap());

/// Advisory metadata derived from a file's content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileContext {
    /// Language detected from the extension, if recognized.
    pub language: Option<Language>,
    /// Module specifiers this file imports.
    pub imports: Vec<String>,
    /// Names this file exports.
    pub exports: Vec<String>,
}

impl FileContext {
    /// Recompute the context from a path and its content.
    pub fn derive(path: &str, content: &str) -> Self {
        let language = Language::from_path(path);

        let mut imports = Vec::new();
        for captures in IMPORT_FROM
            .captures_iter(content)
            .chain(IMPORT_BARE.captures_iter(content))
            .chain(REQUIRE.captures_iter(content))
        {
            let specifier = captures[1].to_string();
            if !imports.contains(&specifier) {
                imports.push(specifier);
            }
        }

        let mut exports = Vec::new();
        for captures in EXPORT_DECL.captures_iter(content) {
            let name = captures[1].to_string();
            if !exports.contains(&name) {
                exports.push(name);
            }
        }
        for captures in EXPORT_BRACE.captures_iter(content) {
            for item in captures[1].split(',') {
                // `a as b` exports `b`; plain `a` exports `a`.
                let name = item
                    .rsplit(" as ")
                    .next()
                    .unwrap_or(item)
                    .trim()
                    .to_string();
                if !name.is_empty() && !exports.contains(&name) {
                    exports.push(name);
                }
            }
        }
        if EXPORT_DEFAULT.is_match(content) && !exports.contains(&"default".to_string()) {
            exports.push("default".to_string());
        }

        Self { language, imports, exports }
    }
}

/// A live file in the working tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Absolute path under the engine root, forward slashes.
    pub path: String,
    /// Current content.
    pub content: String,
    /// Monotonic counter, bumped on every content change.
    pub version: u64,
    /// Derived advisory context. Not part of any hash.
    pub context: FileContext,
}

impl FileEntry {
    fn new(path: String, content: String) -> Self {
        let context = FileContext::derive(&path, &content);
        Self { path, content, version: 0, context }
    }
}

/// The mutable set of live files.
#[derive(Debug, Default)]
pub struct WorkingTree {
    files: BTreeMap<String, FileEntry>,
}

impl WorkingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update a file.
    ///
    /// Writing identical content is a no-op: the version counter only moves
    /// when the bytes change.
    pub fn write(&mut self, path: String, content: String) {
        match self.files.get_mut(&path) {
            Some(entry) => {
                if entry.content != content {
                    entry.context = FileContext::derive(&path, &content);
                    entry.content = content;
                    entry.version += 1;
                }
            }
            None => {
                self.files.insert(path.clone(), FileEntry::new(path, content));
            }
        }
    }

    /// Remove a file. Removing an absent path is a silent no-op.
    pub fn remove(&mut self, path: &str) {
        self.files.remove(path);
    }

    /// Look up a file by absolute path.
    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }

    /// Drop every file.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Iterate all files in path order.
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.files.values()
    }

    /// Number of live files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// List names under `dir`.
    ///
    /// Non-recursive: the unique immediate child segments. Recursive: each
    /// descendant's path relative to `dir`. Both come back sorted; `keep`
    /// filters files by absolute path before any folding.
    pub fn read_dir<F>(&self, dir: &str, recursive: bool, mut keep: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let prefix = if dir.ends_with('/') {
            dir.to_string()
        } else {
            format!("{}/", dir)
        };

        let mut names = std::collections::BTreeSet::new();
        for path in self.files.keys() {
            let Some(rel) = path.strip_prefix(&prefix) else {
                continue;
            };
            if rel.is_empty() || !keep(path) {
                continue;
            }
            if recursive {
                names.insert(rel.to_string());
            } else {
                let segment = rel.split('/').next().unwrap_or(rel);
                names.insert(segment.to_string());
            }
        }

        names.into_iter().collect()
    }
}
