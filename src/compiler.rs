//! # Compiler Boundary
//!
//! The external compiler never touches engine internals: it sees a host
//! interface with five capabilities - existence checks, reads, writes, the
//! working directory, and module resolution. [`EngineHost`] is the shipped
//! implementation, backed by an [`Engine`] through its public read/write
//! surface; compiled outputs land back in the working tree like any other
//! write.

use std::path::PathBuf;

use anyhow::Result;

use crate::engine::Engine;

/// Configuration handed to the compiler collaborator.
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    /// The engine root; also the compiler's working directory.
    pub root: String,
    /// Host directory holding installed packages, when one exists.
    pub package_cache_root: Option<PathBuf>,
}

/// File access capabilities the compiler is allowed.
pub trait CompilerHost {
    /// Whether a file exists at this path.
    fn file_exists(&self, path: &str) -> bool;

    /// Read a file's content, or `None` when absent.
    fn read_file(&self, path: &str) -> Option<String>;

    /// Write an output file. Paths are relative to the engine root.
    fn write_file(&mut self, path: &str, content: &str) -> Result<()>;

    /// The compiler's working directory.
    fn current_dir(&self) -> &str;

    /// Resolve a module specifier against a referring file.
    fn resolve_module(&self, specifier: &str, referrer: &str) -> Option<String>;
}

/// Extensions probed, in order, when a relative specifier has no exact
/// match.
const RESOLUTION_SUFFIXES: &[&str] = &["", ".ts", ".tsx", ".js", "/index.ts"];

/// A [`CompilerHost`] backed by an [`Engine`].
pub struct EngineHost<'a> {
    engine: &'a mut Engine,
    config: CompilerConfig,
}

impl<'a> EngineHost<'a> {
    pub fn new(engine: &'a mut Engine, config: CompilerConfig) -> Self {
        Self { engine, config }
    }
}

impl CompilerHost for EngineHost<'_> {
    fn file_exists(&self, path: &str) -> bool {
        self.engine.read(path).is_some()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.engine.read(path).map(|entry| entry.content.clone())
    }

    fn write_file(&mut self, path: &str, content: &str) -> Result<()> {
        self.engine.write(path, content);
        Ok(())
    }

    fn current_dir(&self) -> &str {
        &self.config.root
    }

    fn resolve_module(&self, specifier: &str, referrer: &str) -> Option<String> {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            let referrer_abs = self.engine.resolve_path(referrer);
            let dir = referrer_abs
                .rsplit_once('/')
                .map(|(dir, _)| dir)
                .unwrap_or("");
            let base = self.engine.resolve_path(&format!("{}/{}", dir, specifier));

            for suffix in RESOLUTION_SUFFIXES {
                let candidate = format!("{}{}", base, suffix);
                if self.engine.read(&candidate).is_some() {
                    return Some(candidate);
                }
            }
            return None;
        }

        // Bare specifier: resolved under the host package cache.
        self.config
            .package_cache_root
            .as_ref()
            .map(|cache| cache.join(specifier).to_string_lossy().replace('\\', "/"))
    }
}
