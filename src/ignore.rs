//! # Ignore Pattern Matching
//!
//! Parses and matches `.gitignore`-style patterns against repository-relative
//! paths (forward slashes, no leading `/`).
//!
//! Supports:
//! - Glob patterns (`*.log`, `build/`, `**/cache`, `?.txt`)
//! - Negation patterns (`!important.log`) - the last matching pattern wins
//! - Root-anchored patterns (`/dist`)
//!
//! Each pattern line is translated into a regular expression:
//!
//! - `**/` matches zero or more path segments
//! - `**` (not followed by `/`) matches anything, including `/`
//! - `*` matches any run of non-`/` characters
//! - `?` matches any single character
//! - a trailing `/` turns the pattern into a directory prefix
//! - a leading `/` anchors the pattern to the repository root
//! - otherwise the pattern matches a whole segment at any depth:
//!   `(^|/)<pattern>($|/.*)`
//!
//! A line that fails to compile is dropped with a warning; a bad pattern
//! never fails status, commit, or enumeration.

use regex::Regex;

/// A single compiled pattern.
#[derive(Debug, Clone)]
struct CompiledPattern {
    regex: Regex,
    /// Whether this is a negation pattern (starts with `!`).
    negative: bool,
}

/// A compiled set of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    patterns: Vec<CompiledPattern>,
}

impl IgnoreFilter {
    /// An empty filter that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a newline-delimited pattern text.
    ///
    /// Empty lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        let mut patterns = Vec::new();

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (pattern, negative) = match trimmed.strip_prefix('!') {
                Some(rest) => (rest, true),
                None => (trimmed, false),
            };
            if pattern.is_empty() {
                continue;
            }

            match compile_pattern(pattern) {
                Ok(regex) => patterns.push(CompiledPattern { regex, negative }),
                Err(err) => {
                    tracing::warn!(pattern, error = %err, "dropping unparsable ignore pattern");
                }
            }
        }

        Self { patterns }
    }

    /// Check whether a repository-relative path is ignored.
    ///
    /// Patterns are evaluated in file order and the last match wins, so a
    /// later negation re-includes a path an earlier pattern excluded.
    pub fn ignores(&self, rel_path: &str) -> bool {
        let mut ignored = false;

        for pattern in &self.patterns {
            if pattern.regex.is_match(rel_path) {
                ignored = !pattern.negative;
            }
        }

        ignored
    }

    /// Whether this filter has any patterns at all.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Compile one pattern (already stripped of any `!` prefix) to a regex.
fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let anchored = pattern.starts_with('/');
    let body = if anchored { &pattern[1..] } else { pattern };
    let directory = body.ends_with('/');

    let core = translate_glob(body);

    let source = match (anchored, directory) {
        (true, true) => format!("^{}.*", core),
        (true, false) => format!("^{}", core),
        (false, true) => format!("{}.*", core),
        // Bare pattern: match the base name or any segment boundary.
        (false, false) => format!("(^|/){}($|/.*)", core),
    };

    Regex::new(&source)
}

/// Translate glob syntax to regex syntax, escaping everything else.
fn translate_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    if chars.get(i + 2) == Some(&'/') {
                        // `**/` - zero or more whole segments.
                        out.push_str("(?:[^/]+/)*");
                        i += 3;
                    } else {
                        // `**` - anything, across segments.
                        out.push_str(".*");
                        i += 2;
                    }
                } else {
                    // `*` - anything within one segment.
                    out.push_str("[^/]*");
                    i += 1;
                }
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            c => {
                if r"\.+()[]{}^$|".contains(c) {
                    out.push('\\');
                }
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
