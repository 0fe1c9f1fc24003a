/*
 * renderer.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Renderer trait definition.
 */

//! Renderer trait: the seam between the adapters and Quarto.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// A single `render` request.
///
/// `input` and `output` are file names relative to `workspace`. The
/// renderer runs with `workspace` as its working directory so relative
/// asset references in the document resolve against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInvocation<'a> {
    /// Directory holding the input file; side files land here too.
    pub workspace: &'a Path,
    /// Input file name.
    pub input: &'a str,
    /// Output file name.
    pub output: &'a str,
    /// Requested output format (e.g. "gfm").
    pub format: &'a str,
    /// Suppress renderer console output.
    pub quiet: bool,
}

impl RenderInvocation<'_> {
    /// Absolute path of the input file.
    pub fn input_path(&self) -> PathBuf {
        self.workspace.join(self.input)
    }

    /// Absolute path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.workspace.join(self.output)
    }
}

/// A single `convert` request (notebook to Markdown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertInvocation<'a> {
    /// Directory holding the input file.
    pub workspace: &'a Path,
    /// Input file name.
    pub input: &'a str,
    /// Output file name.
    pub output: &'a str,
}

impl ConvertInvocation<'_> {
    /// Absolute path of the input file.
    pub fn input_path(&self) -> PathBuf {
        self.workspace.join(self.input)
    }

    /// Absolute path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.workspace.join(self.output)
    }
}

/// Something that can turn Quarto sources into Markdown.
///
/// [`QuartoCli`](crate::QuartoCli) is the production implementation.
/// Implementations block until the output file has been written (or the
/// attempt has failed); they never touch the process working directory.
pub trait Renderer: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Render `invocation.input` into `invocation.output`.
    fn render(&self, invocation: &RenderInvocation<'_>) -> Result<()>;

    /// Convert `invocation.input` (a notebook) into `invocation.output`.
    fn convert(&self, invocation: &ConvertInvocation<'_>) -> Result<()>;
}
