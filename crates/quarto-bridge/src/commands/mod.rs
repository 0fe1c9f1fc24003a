//! Command implementations for quarto-bridge
//!
//! Each command module handles the CLI interface and delegates to the
//! bridge crates for the actual work.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

pub mod check;
pub mod convert;
pub mod render;

/// Write `text` to `output`, or to stdout when no file is given.
fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write output file {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")
        }
    }
}
