/*
 * mkdocs-quarto
 * Copyright (c) 2025 Posit, PBC
 *
 * Static site plugin that renders Quarto pages and notebooks.
 */

//! Static site plugin that renders Quarto pages and notebooks.
//!
//! [`QuartoPlugin`] handles three site events:
//!
//! - `on_files` gives `.qmd` and `.ipynb` sources an `.html` destination
//! - `on_page_read_source` converts notebooks to Markdown
//! - `on_page_markdown` renders Quarto pages and publishes their figures
//!
//! The [`site`] module holds the file, page, configuration and plugin model
//! these events run against.
//!
//! ```ignore
//! use mkdocs_quarto::{PluginCollection, QuartoPlugin, SiteConfig};
//!
//! let config = SiteConfig::from_yaml(&std::fs::read_to_string("mkdocs.yml")?)?;
//! let mut plugins = PluginCollection::new();
//! plugins.register(Box::new(QuartoPlugin::load(&config)?));
//! ```

mod plugin;
pub mod site;

pub use plugin::{
    PLUGIN_NAME, QUARTO_SUFFIXES, QuartoPlugin, QuartoPluginConfig, is_quarto_page,
};
pub use site::{
    DOCUMENTATION_EXTENSIONS, File, Files, HookError, Page, PluginCollection, PluginError,
    SiteConfig, SitePlugin,
};
