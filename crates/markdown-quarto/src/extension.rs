/*
 * extension.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Quarto preprocessor for the Markdown pipeline.
 */

//! Quarto preprocessor for the Markdown pipeline.
//!
//! [`QuartoExtension`] registers a [`QuartoPreprocessor`] that renders the
//! whole document through Quarto before the Markdown parser sees it, so
//! executable code chunks are replaced by their results.

use std::sync::Arc;

use quarto_render_bridge::{
    DocumentNames, QuartoCli, RenderSettings, Renderer, Result, render_document,
};

use crate::pipeline::{Extension, Markdown, Preprocessor, PreprocessorError};

/// Registry name of the Quarto preprocessor.
pub const PREPROCESSOR_NAME: &str = "quarto_preprocessor";

/// Priority of the Quarto preprocessor. High, so it sees the raw source.
pub const PREPROCESSOR_PRIORITY: i32 = 100;

const INPUT_NAME: &str = "input.qmd";
const OUTPUT_NAME: &str = "output.md";

/// Extension that adds Quarto rendering to a [`Markdown`] pipeline.
#[derive(Clone)]
pub struct QuartoExtension {
    renderer: Arc<dyn Renderer>,
    settings: RenderSettings,
}

impl QuartoExtension {
    /// Create an extension around an existing renderer.
    pub fn new(renderer: Arc<dyn Renderer>, settings: RenderSettings) -> Self {
        Self { renderer, settings }
    }

    /// Create an extension using the quarto binary selected by `settings`.
    pub fn from_settings(settings: RenderSettings) -> Result<Self> {
        let cli = QuartoCli::from_settings(&settings)?;
        Ok(Self::new(Arc::new(cli), settings))
    }

    /// Create an extension with default settings and a discovered quarto.
    pub fn discover() -> Result<Self> {
        Self::from_settings(RenderSettings::default())
    }
}

impl Extension for QuartoExtension {
    fn name(&self) -> &str {
        "quarto"
    }

    fn extend_markdown(&self, md: &mut Markdown) {
        md.register_extension(self.name());
        md.preprocessors.register(
            Box::new(QuartoPreprocessor::new(
                Arc::clone(&self.renderer),
                self.settings.clone(),
            )),
            PREPROCESSOR_NAME,
            PREPROCESSOR_PRIORITY,
        );
    }
}

/// Preprocessor that replaces the document with Quarto's rendering of it.
pub struct QuartoPreprocessor {
    renderer: Arc<dyn Renderer>,
    settings: RenderSettings,
}

impl QuartoPreprocessor {
    /// Create a preprocessor around an existing renderer.
    pub fn new(renderer: Arc<dyn Renderer>, settings: RenderSettings) -> Self {
        Self { renderer, settings }
    }
}

impl Preprocessor for QuartoPreprocessor {
    fn run(&self, lines: Vec<String>) -> std::result::Result<Vec<String>, PreprocessorError> {
        Ok(quarto_render_markdown_with(
            self.renderer.as_ref(),
            &lines,
            &self.settings,
        )?)
    }
}

/// Render `lines` with a discovered quarto binary and default settings.
pub fn quarto_render_markdown<S: AsRef<str>>(lines: &[S]) -> Result<Vec<String>> {
    let quarto = QuartoCli::discover()?;
    quarto_render_markdown_with(&quarto, lines, &RenderSettings::default())
}

/// Render `lines` through `renderer` and return the output's lines.
///
/// Every input line is written followed by a newline unless it already
/// ends with one; line content is otherwise preserved exactly.
pub fn quarto_render_markdown_with<S: AsRef<str>>(
    renderer: &dyn Renderer,
    lines: &[S],
    settings: &RenderSettings,
) -> Result<Vec<String>> {
    let source = join_lines(lines);
    let rendered = render_document(
        renderer,
        &source,
        &DocumentNames::new(INPUT_NAME, OUTPUT_NAME),
        settings,
    )?;

    Ok(rendered.markdown.lines().map(str::to_string).collect())
}

/// Concatenate lines, terminating each with `\n` if it is not already.
fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut source = String::new();
    for line in lines {
        let line = line.as_ref();
        source.push_str(line);
        if !line.ends_with('\n') {
            source.push('\n');
        }
    }
    source
}
