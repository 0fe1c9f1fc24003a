//! Check command implementation

use anyhow::{Context, Result};
use quarto_render_bridge::{QuartoCli, RenderSettings};

/// Execute the check command
pub fn execute(settings: &RenderSettings) -> Result<()> {
    let quarto = QuartoCli::from_settings(settings).context(
        "quarto was not found; install it, add it to PATH, or set QUARTO_PATH",
    )?;
    let version = quarto
        .version()
        .with_context(|| format!("Failed to run {}", quarto.binary().display()))?;

    println!("quarto: {}", quarto.binary().display());
    println!("version: {}", version);
    Ok(())
}
