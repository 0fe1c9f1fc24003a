//! Convert command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use quarto_render_bridge::{QuartoCli, RenderSettings, convert_notebook};
use tracing::info;

/// Arguments for the convert command
#[derive(Debug)]
pub struct ConvertArgs {
    /// Notebook to convert
    pub notebook: PathBuf,
    /// Output file; stdout when unset
    pub output: Option<PathBuf>,
}

/// Execute the convert command
pub fn execute(args: ConvertArgs, settings: &RenderSettings) -> Result<()> {
    let quarto = QuartoCli::from_settings(settings).context("Failed to locate quarto")?;

    if !settings.quiet {
        info!("Converting {}", args.notebook.display());
    }

    let markdown = convert_notebook(&quarto, &args.notebook)
        .with_context(|| format!("Failed to convert {}", args.notebook.display()))?;

    super::write_output(args.output.as_deref(), &markdown)
}
