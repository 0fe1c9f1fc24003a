/*
 * quarto.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Quarto subprocess management.
 */

//! Quarto subprocess management.
//!
//! This module provides:
//! - Finding the quarto binary on the system
//! - [`QuartoCli`], a [`Renderer`] that shells out to `quarto render` and
//!   `quarto convert`
//!
//! # Finding quarto
//!
//! The [`find_quarto`] function searches in this order:
//! 1. `QUARTO_PATH` environment variable (binary, or installation directory)
//! 2. System PATH via `which`
//!
//! # Working directory
//!
//! Every subprocess is started with its working directory set to the
//! render workspace via [`Command::current_dir`]. The working directory of
//! the calling process is never changed, so concurrent renders do not
//! interfere with each other.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::renderer::{ConvertInvocation, RenderInvocation, Renderer};
use crate::settings::RenderSettings;

/// Environment variable pointing at a quarto binary or installation.
pub const QUARTO_PATH_ENV: &str = "QUARTO_PATH";

// ============================================================================
// Binary Discovery
// ============================================================================

/// Find the quarto binary on the system.
///
/// `QUARTO_PATH` may be either the binary itself or an installation
/// directory (checked for `bin/quarto`, then `quarto`). Falls back to PATH.
pub fn find_quarto() -> Option<PathBuf> {
    if let Ok(quarto_path) = std::env::var(QUARTO_PATH_ENV)
        && let Some(found) = resolve_quarto_path(Path::new(&quarto_path))
    {
        return Some(found);
    }

    which::which("quarto").ok()
}

/// Resolve a `QUARTO_PATH`-style value to a binary.
fn resolve_quarto_path(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    if path.is_dir() {
        let in_bin = path.join("bin").join(quarto_name());
        if in_bin.is_file() {
            return Some(in_bin);
        }

        let direct = path.join(quarto_name());
        if direct.is_file() {
            return Some(direct);
        }
    }

    None
}

/// Get the platform-appropriate quarto binary name.
fn quarto_name() -> &'static str {
    #[cfg(windows)]
    {
        "quarto.exe"
    }
    #[cfg(not(windows))]
    {
        "quarto"
    }
}

// ============================================================================
// QuartoCli
// ============================================================================

/// Renderer backed by the quarto command-line tool.
#[derive(Debug, Clone)]
pub struct QuartoCli {
    binary: PathBuf,
}

impl QuartoCli {
    /// Locate quarto with [`find_quarto`].
    pub fn discover() -> Result<Self> {
        find_quarto()
            .map(Self::with_binary)
            .ok_or(BridgeError::QuartoNotFound)
    }

    /// Use an explicit binary, skipping discovery.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Use `settings.quarto_path` when set, otherwise discover.
    pub fn from_settings(settings: &RenderSettings) -> Result<Self> {
        match &settings.quarto_path {
            Some(path) => Ok(Self::with_binary(path)),
            None => Self::discover(),
        }
    }

    /// Path to the quarto binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Report the version of the quarto binary (`quarto --version`).
    pub fn version(&self) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--version");
        let output = self.run("version", cmd)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Spawn `cmd`, wait for it, and fail on a non-zero exit.
    fn run(&self, action: &str, mut cmd: Command) -> Result<Output> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(action, command = ?cmd, "Running quarto");

        let output = cmd.output().map_err(|source| BridgeError::Spawn {
            program: self.binary.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(BridgeError::renderer_failed(
                action,
                output.status.code().unwrap_or(-1),
                stderr.trim_end(),
            ));
        }

        Ok(output)
    }
}

impl Renderer for QuartoCli {
    fn name(&self) -> &str {
        "quarto"
    }

    fn render(&self, invocation: &RenderInvocation<'_>) -> Result<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("render")
            .arg(invocation.input)
            .arg("--to")
            .arg(invocation.format)
            .arg("--output")
            .arg(invocation.output)
            .current_dir(invocation.workspace);

        if invocation.quiet {
            cmd.arg("--quiet");
        }

        self.run("render", cmd).map(|_| ())
    }

    fn convert(&self, invocation: &ConvertInvocation<'_>) -> Result<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("convert")
            .arg(invocation.input)
            .arg("--output")
            .arg(invocation.output)
            .current_dir(invocation.workspace);

        self.run("convert", cmd).map(|_| ())
    }
}
