/*
 * settings.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render settings shared by the adapters.
 */

//! Render settings shared by the adapters.

use std::path::PathBuf;

use serde::Deserialize;

/// Output format requested from Quarto when none is configured.
pub const DEFAULT_OUTPUT_FORMAT: &str = "gfm";

/// Settings controlling how Quarto is invoked.
///
/// Hosts usually embed this in their own configuration (for example as
/// part of a plugin's options block), so every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RenderSettings {
    /// Explicit path to the quarto binary. Discovery is used when unset.
    pub quarto_path: Option<PathBuf>,

    /// Markdown dialect Quarto should emit.
    pub output_format: String,

    /// Pass `--quiet` to `quarto render`.
    pub quiet: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            quarto_path: None,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            quiet: false,
        }
    }
}

impl RenderSettings {
    /// Set the output format.
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    /// Set quiet mode.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set an explicit quarto binary.
    pub fn with_quarto_path(mut self, path: Option<PathBuf>) -> Self {
        self.quarto_path = path;
        self
    }
}
