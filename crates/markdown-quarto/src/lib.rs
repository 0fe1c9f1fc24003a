/*
 * markdown-quarto
 * Copyright (c) 2025 Posit, PBC
 *
 * Markdown preprocessor that renders documents through Quarto.
 */

//! Markdown preprocessor that renders documents through Quarto.
//!
//! ```ignore
//! use markdown_quarto::{Markdown, QuartoExtension};
//!
//! let quarto = QuartoExtension::discover()?;
//! let md = Markdown::with_extensions(&[&quarto]);
//! let html = md.convert("```{python}\nprint(1 + 1)\n```\n")?;
//! ```

mod extension;
pub mod pipeline;

pub use extension::{
    PREPROCESSOR_NAME, PREPROCESSOR_PRIORITY, QuartoExtension, QuartoPreprocessor,
    quarto_render_markdown, quarto_render_markdown_with,
};
pub use pipeline::{
    Extension, Markdown, PipelineError, Preprocessor, PreprocessorError, Registry,
};
