//! # Sandbox Runner
//!
//! Executes compiled output in an isolated container. The engine's files
//! are materialized into a host temp directory, the directory is bound
//! read-only into the container, and the configured command runs under
//! memory and CPU quotas with a wall-clock deadline. On timeout the
//! container process is killed and the run fails.
//!
//! The container runtime is external; this module only assembles the
//! invocation and supervises the child process.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use crate::engine::Engine;

/// Configuration for one sandboxed run.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Entry-point path, relative to the engine root (e.g. `main.ts`).
    pub entry_point: String,
    /// Container runtime executable.
    pub runtime: String,
    /// Container image.
    pub image: String,
    /// Command run inside the container. `{entry}` and `{out}` expand to
    /// the entry point and its compiled output path. `None` uses the
    /// default: invoke the runtime on `out/<name>.js`.
    pub command: Option<Vec<String>>,
    /// Environment variables set inside the container.
    pub env: Vec<(String, String)>,
    /// Container memory quota (e.g. `512m`).
    pub memory_limit: String,
    /// Container CPU quota (e.g. `1.0`).
    pub cpus: String,
    /// Host package cache bound read-only at `/packages`, when set.
    pub package_cache: Option<PathBuf>,
    /// Wall-clock limit for the whole run.
    pub timeout: Duration,
}

impl SandboxConfig {
    /// A config with the default runtime, image, quotas, and timeout.
    pub fn new(entry_point: impl Into<String>) -> Self {
        Self {
            entry_point: entry_point.into(),
            runtime: "docker".to_string(),
            image: "node:20-alpine".to_string(),
            command: None,
            env: Vec::new(),
            memory_limit: "512m".to_string(),
            cpus: "1.0".to_string(),
            package_cache: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// The compiled output path for the entry point: `<name>.ts` maps to
    /// `out/<name>.js`.
    fn output_path(&self) -> String {
        let stem = Path::new(&self.entry_point)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "main".to_string());
        format!("out/{}.js", stem)
    }

    /// The command line run inside the container.
    fn command_line(&self) -> Vec<String> {
        let out = self.output_path();
        match &self.command {
            Some(parts) => parts
                .iter()
                .map(|part| part.replace("{entry}", &self.entry_point).replace("{out}", &out))
                .collect(),
            None => vec!["node".to_string(), out],
        }
    }
}

/// Captured result of a completed run.
#[derive(Debug)]
pub struct SandboxOutput {
    /// Process exit code (`-1` when killed by a signal).
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Write every engine file into a fresh temp directory.
///
/// Paths inside the directory mirror the engine-root-relative layout. The
/// directory is deleted when the returned handle drops.
pub fn materialize(engine: &Engine) -> Result<tempfile::TempDir> {
    let dir = tempfile::tempdir().context("failed to create sandbox directory")?;

    for entry in engine.get_all_files() {
        let rel = engine.rel_path(&entry.path);
        if rel.is_empty() {
            continue;
        }
        let target = dir.path().join(&rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, &entry.content)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }

    Ok(dir)
}

/// Materialize the engine and run the configured command in a container.
pub fn run(engine: &Engine, config: &SandboxConfig) -> Result<SandboxOutput> {
    let workspace = materialize(engine).context("failed to materialize working tree")?;

    let mut command = Command::new(&config.runtime);
    command
        .arg("run")
        .arg("--rm")
        .arg("-v")
        .arg(format!("{}:/workspace:ro", workspace.path().display()))
        .arg("--workdir")
        .arg("/workspace")
        .arg("--memory")
        .arg(&config.memory_limit)
        .arg("--cpus")
        .arg(&config.cpus);

    if let Some(cache) = &config.package_cache {
        command.arg("-v").arg(format!("{}:/packages:ro", cache.display()));
    }
    for (key, value) in &config.env {
        command.arg("-e").arg(format!("{}={}", key, value));
    }

    command.arg(&config.image).args(config.command_line());
    command.stdout(Stdio::piped()).stderr(Stdio::piped());

    tracing::debug!(runtime = %config.runtime, entry = %config.entry_point, "launching sandbox");
    let child = command
        .spawn()
        .with_context(|| format!("failed to launch container runtime '{}'", config.runtime))?;

    let output = wait_with_deadline(child, config.timeout)?;
    Ok(SandboxOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Poll a child until it exits or the deadline passes; kill it on timeout.
fn wait_with_deadline(mut child: Child, timeout: Duration) -> Result<Output> {
    let deadline = Instant::now() + timeout;

    loop {
        if child.try_wait().context("failed to poll sandbox process")?.is_some() {
            return Ok(child.wait_with_output()?);
        }
        if Instant::now() >= deadline {
            child.kill().ok();
            child.wait().ok();
            bail!("sandbox timed out after {:?}", timeout);
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}
