/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! Runs a document through the Markdown pipeline with the Quarto extension
//! installed. By default the preprocessed Markdown is emitted; `--html`
//! carries on to HTML.

use std::path::PathBuf;

use anyhow::{Context, Result};
use markdown_quarto::{Markdown, QuartoExtension};
use quarto_render_bridge::RenderSettings;
use tracing::info;

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    /// Input document
    pub input: PathBuf,
    /// Output file; stdout when unset
    pub output: Option<PathBuf>,
    /// Emit HTML instead of Markdown
    pub html: bool,
}

/// Execute the render command
pub fn execute(args: RenderArgs, settings: RenderSettings) -> Result<()> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file {}", args.input.display()))?;

    let quiet = settings.quiet;
    let extension =
        QuartoExtension::from_settings(settings).context("Failed to locate quarto")?;
    let md = Markdown::with_extensions(&[&extension]);

    if !quiet {
        info!("Rendering {}", args.input.display());
    }

    let rendered = if args.html {
        md.convert(&source)
    } else {
        md.preprocess(&source).map(|lines| {
            let mut text = lines.join("\n");
            text.push('\n');
            text
        })
    };
    let text = rendered.with_context(|| format!("Failed to render {}", args.input.display()))?;

    super::write_output(args.output.as_deref(), &text)?;

    if !quiet && let Some(output) = &args.output {
        info!("Output created: {}", output.display());
    }

    Ok(())
}
