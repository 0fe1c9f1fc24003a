/*
 * pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Markdown processing pipeline with pluggable preprocessors.
 */

//! Markdown processing pipeline with pluggable preprocessors.
//!
//! A [`Markdown`] instance converts Markdown source to HTML in two steps:
//!
//! 1. The source is split into lines and handed through every registered
//!    [`Preprocessor`], highest priority first. Each preprocessor returns
//!    a new line sequence.
//! 2. The resulting lines are rendered to HTML with comrak (GFM extensions).
//!
//! [`Extension`]s hook into a `Markdown` instance at construction time and
//! register their preprocessors there.

use comrak::Options;
use thiserror::Error;
use tracing::debug;

/// Error type preprocessors return; the pipeline wraps it with the
/// preprocessor's name.
pub type PreprocessorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A preprocessor failed; the document is abandoned.
    #[error("Preprocessor '{name}' failed: {source}")]
    Preprocessor {
        /// Registered name of the preprocessor
        name: String,
        /// The preprocessor's error
        #[source]
        source: PreprocessorError,
    },
}

/// A stage that rewrites the document's lines before parsing.
pub trait Preprocessor: Send + Sync {
    /// Transform `lines` into a new line sequence.
    fn run(&self, lines: Vec<String>) -> Result<Vec<String>, PreprocessorError>;
}

/// Something that configures a [`Markdown`] instance.
pub trait Extension {
    /// Name recorded in [`Markdown::registered_extensions`].
    fn name(&self) -> &str;

    /// Register preprocessors (or other hooks) on `md`.
    fn extend_markdown(&self, md: &mut Markdown);
}

struct RegistryEntry<T> {
    name: String,
    priority: i32,
    item: T,
}

/// Named, priority-ordered collection of pipeline items.
///
/// Higher priorities come first. Registering a name that already exists
/// replaces the previous entry. Entries with equal priority keep their
/// registration order.
pub struct Registry<T> {
    entries: Vec<RegistryEntry<T>>,
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `item` under `name` at `priority`.
    pub fn register(&mut self, item: T, name: impl Into<String>, priority: i32) {
        let name = name.into();
        self.entries.retain(|entry| entry.name != name);
        self.entries.push(RegistryEntry {
            name,
            priority,
            item,
        });
        self.entries.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Remove the entry registered under `name`, returning it.
    pub fn deregister(&mut self, name: &str) -> Option<T> {
        let index = self.entries.iter().position(|entry| entry.name == name)?;
        Some(self.entries.remove(index).item)
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.item)
    }

    /// Priority of the entry registered under `name`.
    pub fn priority(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.priority)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Iterate `(name, item)` pairs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.item))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Markdown to HTML converter with a preprocessor stage.
pub struct Markdown {
    /// Line preprocessors, run before parsing.
    pub preprocessors: Registry<Box<dyn Preprocessor>>,
    registered_extensions: Vec<String>,
    options: Options<'static>,
}

impl Markdown {
    /// Create a converter with no extensions.
    pub fn new() -> Self {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        // Quarto output embeds raw HTML for figures and tables.
        options.render.unsafe_ = true;

        Self {
            preprocessors: Registry::new(),
            registered_extensions: Vec::new(),
            options,
        }
    }

    /// Create a converter and apply `extensions` in order.
    pub fn with_extensions(extensions: &[&dyn Extension]) -> Self {
        let mut md = Self::new();
        for extension in extensions {
            extension.extend_markdown(&mut md);
        }
        md
    }

    /// Record that an extension has been applied.
    pub fn register_extension(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.registered_extensions.contains(&name) {
            self.registered_extensions.push(name);
        }
    }

    /// Names of applied extensions, in application order.
    pub fn registered_extensions(&self) -> &[String] {
        &self.registered_extensions
    }

    /// Split `source` into lines and run every preprocessor over them.
    pub fn preprocess(&self, source: &str) -> Result<Vec<String>, PipelineError> {
        let mut lines: Vec<String> = source.lines().map(str::to_string).collect();

        for (name, preprocessor) in self.preprocessors.iter() {
            debug!(preprocessor = name, lines = lines.len(), "Running preprocessor");
            lines = preprocessor
                .run(lines)
                .map_err(|source| PipelineError::Preprocessor {
                    name: name.to_string(),
                    source,
                })?;
        }

        Ok(lines)
    }

    /// Convert `source` to HTML.
    pub fn convert(&self, source: &str) -> Result<String, PipelineError> {
        let lines = self.preprocess(source)?;
        let mut text = lines.join("\n");
        text.push('\n');
        Ok(comrak::markdown_to_html(&text, &self.options))
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}
