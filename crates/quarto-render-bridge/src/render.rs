/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render and convert operations.
 */

//! Render and convert operations.
//!
//! Each call follows the same shape: create a [`RenderWorkspace`], place
//! the input, invoke the renderer with the workspace as its working
//! directory, read the declared output, capture side artifacts, remove the
//! workspace. Nothing is retained between calls.

use std::path::Path;

use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::renderer::{ConvertInvocation, RenderInvocation, Renderer};
use crate::settings::RenderSettings;
use crate::workspace::{RenderWorkspace, SideArtifact};

/// Input and output file names for one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNames {
    /// Name the source is written under (its extension selects the Quarto reader).
    pub input: String,
    /// Name Quarto is asked to write.
    pub output: String,
}

impl DocumentNames {
    /// Create names from an input and output file name.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

impl Default for DocumentNames {
    fn default() -> Self {
        Self::new("input.qmd", "output.md")
    }
}

/// Result of rendering one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Rendered Markdown text.
    pub markdown: String,
    /// Files the renderer emitted next to the output.
    pub artifacts: Vec<SideArtifact>,
}

/// Render `source` through `renderer` in a fresh workspace.
pub fn render_document(
    renderer: &dyn Renderer,
    source: &str,
    names: &DocumentNames,
    settings: &RenderSettings,
) -> Result<RenderedDocument> {
    let workspace = RenderWorkspace::create(names.input.clone(), names.output.clone())?;
    workspace.write_input(source)?;

    let invocation = RenderInvocation {
        workspace: workspace.path(),
        input: workspace.input_name(),
        output: workspace.output_name(),
        format: &settings.output_format,
        quiet: settings.quiet,
    };
    debug!(
        renderer = renderer.name(),
        input = invocation.input,
        format = invocation.format,
        "Rendering document"
    );
    renderer.render(&invocation)?;

    let markdown = workspace.read_output()?;
    let artifacts = workspace.side_artifacts()?;
    debug!(
        bytes = markdown.len(),
        artifacts = artifacts.len(),
        "Rendered document"
    );

    workspace.close()?;

    Ok(RenderedDocument {
        markdown,
        artifacts,
    })
}

/// Convert a notebook on disk to Markdown.
///
/// The notebook is copied into a fresh workspace under its own file name
/// and converted to `<stem>.md`. A failed conversion is an error; a stale
/// or empty output is never returned.
pub fn convert_notebook(renderer: &dyn Renderer, source: &Path) -> Result<String> {
    let input_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            BridgeError::host_api(format!("'{}' has no file name", source.display()))
        })?;
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| BridgeError::host_api(format!("'{}' has no stem", source.display())))?;

    let workspace = RenderWorkspace::create(input_name, format!("{}.md", stem))?;
    workspace.copy_input_from(source)?;

    let invocation = ConvertInvocation {
        workspace: workspace.path(),
        input: workspace.input_name(),
        output: workspace.output_name(),
    };
    debug!(renderer = renderer.name(), input = invocation.input, "Converting notebook");
    renderer.convert(&invocation)?;

    let markdown = workspace.read_output()?;
    debug!(bytes = markdown.len(), "Converted notebook");

    workspace.close()?;
    Ok(markdown)
}
