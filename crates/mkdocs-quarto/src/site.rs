/*
 * site.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Site model and plugin events.
 */

//! Site model and plugin events.
//!
//! This is the part of a static site generator that plugins see:
//!
//! - [`File`] / [`Files`] - every source file of the site and where it is
//!   written in the built site
//! - [`Page`] - a documentation page being built
//! - [`SiteConfig`] - site-wide settings (`docs_dir`, `site_dir`, ...)
//! - [`SitePlugin`] - the three events a plugin may handle
//! - [`PluginCollection`] - dispatches events to plugins in order
//!
//! Events run in this order for a build: `on_files` once for the whole
//! collection, then per page `on_page_read_source` followed by
//! `on_page_markdown`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Extensions of files treated as documentation pages.
pub const DOCUMENTATION_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd"];

/// Error type plugin hooks return.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while dispatching plugin events.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin hook failed.
    #[error("Plugin '{plugin}' failed in {event}: {source}")]
    Hook {
        /// Plugin name
        plugin: String,
        /// Event name
        event: &'static str,
        /// The hook's error
        #[source]
        source: HookError,
    },

    /// A plugin's configuration block could not be parsed.
    #[error("Invalid configuration for plugin '{plugin}': {source}")]
    Config {
        /// Plugin name
        plugin: String,
        /// Parse error
        #[source]
        source: serde_yaml::Error,
    },

    /// A plugin could not be set up.
    #[error("Failed to set up plugin '{plugin}': {source}")]
    Setup {
        /// Plugin name
        plugin: String,
        /// Setup error
        #[source]
        source: HookError,
    },

    /// The default source read failed.
    #[error("Failed to read {}: {source}", path.display())]
    ReadSource {
        /// Source path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A page has no source path to read from.
    #[error("Page '{0}' has no source path")]
    NoSource(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Site-wide configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub site_name: Option<String>,

    /// Directory holding the sources.
    pub docs_dir: PathBuf,

    /// Directory the built site is written to.
    pub site_dir: PathBuf,

    /// Emit `page/index.html` instead of `page.html` for Markdown pages.
    pub use_directory_urls: bool,

    /// Raw per-plugin configuration blocks, keyed by plugin name.
    pub plugins: BTreeMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: None,
            docs_dir: PathBuf::from("docs"),
            site_dir: PathBuf::from("site"),
            use_directory_urls: true,
            plugins: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Parse a YAML site configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Deserialize the configuration block of plugin `name`.
    ///
    /// A missing or null block yields the plugin's defaults.
    pub fn plugin_config<T>(&self, name: &str) -> Result<T, PluginError>
    where
        T: DeserializeOwned + Default,
    {
        match self.plugins.get(name) {
            None | Some(serde_yaml::Value::Null) => Ok(T::default()),
            Some(value) => {
                serde_yaml::from_value(value.clone()).map_err(|source| PluginError::Config {
                    plugin: name.to_string(),
                    source,
                })
            }
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// A source file of the site.
///
/// Paths are URIs: relative, `/`-separated, rooted at `src_dir` for the
/// source and `dest_dir` for the built file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Source path relative to `src_dir`.
    pub src_uri: String,
    /// Page name (file stem; `README` pages are named `index`).
    pub name: String,
    /// Source root, if the file exists on disk.
    pub src_dir: Option<PathBuf>,
    /// Output root.
    pub dest_dir: PathBuf,
    /// Whether directory URLs are in use.
    pub use_directory_urls: bool,
    dest_uri: String,
    url: String,
    documentation_page: bool,
}

impl File {
    /// Describe the file at `path` (relative to `src_dir`).
    pub fn new(
        path: impl AsRef<str>,
        src_dir: Option<&Path>,
        dest_dir: &Path,
        use_directory_urls: bool,
    ) -> Self {
        let src_uri = path.as_ref().replace('\\', "/");
        let documentation_page = has_documentation_extension(&src_uri);
        let name = page_name(&src_uri, documentation_page);
        let dest_uri = default_dest_uri(&src_uri, &name, documentation_page, use_directory_urls);
        let url = url_for(&dest_uri, use_directory_urls);

        Self {
            src_uri,
            name,
            src_dir: src_dir.map(Path::to_path_buf),
            dest_dir: dest_dir.to_path_buf(),
            use_directory_urls,
            dest_uri,
            url,
            documentation_page,
        }
    }

    /// Output path relative to `dest_dir`.
    pub fn dest_uri(&self) -> &str {
        &self.dest_uri
    }

    /// Change the output path; the URL follows.
    pub fn set_dest_uri(&mut self, dest_uri: impl Into<String>) {
        self.dest_uri = dest_uri.into();
        self.url = url_for(&self.dest_uri, self.use_directory_urls);
    }

    /// URL of the built file relative to the site root.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Absolute source path, when the file has a source root.
    pub fn abs_src_path(&self) -> Option<PathBuf> {
        self.src_dir.as_ref().map(|dir| dir.join(&self.src_uri))
    }

    /// Absolute output path.
    pub fn abs_dest_path(&self) -> PathBuf {
        self.dest_dir.join(&self.dest_uri)
    }

    /// Whether the file is built as a documentation page.
    pub fn is_documentation_page(&self) -> bool {
        self.documentation_page
    }

    /// Mark (or unmark) the file as a documentation page.
    pub fn set_documentation_page(&mut self, documentation_page: bool) {
        self.documentation_page = documentation_page;
    }
}

fn has_documentation_extension(uri: &str) -> bool {
    Path::new(uri)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            DOCUMENTATION_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn page_name(src_uri: &str, documentation_page: bool) -> String {
    let stem = Path::new(src_uri)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if documentation_page && stem.eq_ignore_ascii_case("readme") {
        "index".to_string()
    } else {
        stem.to_string()
    }
}

/// Split a URI into its directory part ("" at the root) and file name.
fn split_uri(uri: &str) -> (&str, &str) {
    match uri.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", uri),
    }
}

fn join_uri(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

fn default_dest_uri(
    src_uri: &str,
    name: &str,
    documentation_page: bool,
    use_directory_urls: bool,
) -> String {
    if !documentation_page {
        return src_uri.to_string();
    }

    let (dir, _) = split_uri(src_uri);
    if !use_directory_urls || name == "index" {
        join_uri(dir, &format!("{}.html", name))
    } else {
        join_uri(&join_uri(dir, name), "index.html")
    }
}

fn url_for(dest_uri: &str, use_directory_urls: bool) -> String {
    let (dir, file) = split_uri(dest_uri);
    if use_directory_urls && file == "index.html" {
        let dir = if dir.is_empty() { "." } else { dir };
        format!("{}/", dir)
    } else {
        dest_uri.to_string()
    }
}

/// Ordered collection of site files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Files {
    files: Vec<File>,
}

impl Files {
    /// Create a collection from `files`.
    pub fn new(files: Vec<File>) -> Self {
        Self { files }
    }

    /// Add `file`, replacing any entry with the same `src_uri`.
    ///
    /// Returns the replaced entry.
    pub fn append(&mut self, file: File) -> Option<File> {
        match self.files.iter_mut().find(|f| f.src_uri == file.src_uri) {
            Some(existing) => {
                if existing.src_dir != file.src_dir {
                    warn!(
                        src = %file.src_uri,
                        "Replacing a site file that comes from a different source directory"
                    );
                }
                Some(std::mem::replace(existing, file))
            }
            None => {
                self.files.push(file);
                None
            }
        }
    }

    /// Find a file by source URI.
    pub fn get_file_from_path(&self, src_uri: &str) -> Option<&File> {
        let src_uri = src_uri.replace('\\', "/");
        self.files.iter().find(|f| f.src_uri == src_uri)
    }

    /// Iterate the files.
    pub fn iter(&self) -> std::slice::Iter<'_, File> {
        self.files.iter()
    }

    /// Iterate the files mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, File> {
        self.files.iter_mut()
    }

    /// Files built as documentation pages.
    pub fn documentation_pages(&self) -> Vec<&File> {
        self.files
            .iter()
            .filter(|f| f.is_documentation_page())
            .collect()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl IntoIterator for Files {
    type Item = File;
    type IntoIter = std::vec::IntoIter<File>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a Files {
    type Item = &'a File;
    type IntoIter = std::slice::Iter<'a, File>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl FromIterator<File> for Files {
    fn from_iter<I: IntoIterator<Item = File>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Pages
// ============================================================================

/// A documentation page being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The page's file.
    pub file: File,
    /// Page source, once read.
    pub markdown: Option<String>,
}

impl Page {
    /// Create a page for `file`.
    pub fn new(file: File) -> Self {
        Self {
            file,
            markdown: None,
        }
    }

    /// Load the page source: a plugin override if one answers, else the
    /// file on disk.
    pub fn read_source(
        &mut self,
        plugins: &PluginCollection,
        config: &SiteConfig,
    ) -> Result<(), PluginError> {
        let source = match plugins.run_on_page_read_source(self, config)? {
            Some(source) => source,
            None => {
                let path = self
                    .file
                    .abs_src_path()
                    .ok_or_else(|| PluginError::NoSource(self.file.src_uri.clone()))?;
                std::fs::read_to_string(&path)
                    .map_err(|source| PluginError::ReadSource { path, source })?
            }
        };
        self.markdown = Some(source);
        Ok(())
    }
}

// ============================================================================
// Plugins
// ============================================================================

/// Events a site plugin can handle. Every event defaults to a no-op.
pub trait SitePlugin: Send + Sync {
    /// Plugin name used in errors and logs.
    fn name(&self) -> &str;

    /// Inspect or rewrite the full file collection.
    fn on_files(&self, files: Files, _config: &SiteConfig) -> Result<Files, HookError> {
        Ok(files)
    }

    /// Supply a page's source text. `None` means "read the file as usual".
    fn on_page_read_source(
        &self,
        _page: &Page,
        _config: &SiteConfig,
    ) -> Result<Option<String>, HookError> {
        Ok(None)
    }

    /// Rewrite a page's Markdown before it is converted to HTML.
    fn on_page_markdown(
        &self,
        markdown: String,
        _page: &Page,
        _config: &SiteConfig,
        _files: &mut Files,
    ) -> Result<String, HookError> {
        Ok(markdown)
    }
}

/// Plugins of a site, in registration order.
#[derive(Default)]
pub struct PluginCollection {
    plugins: Vec<Box<dyn SitePlugin>>,
}

impl PluginCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin after the existing ones.
    pub fn register(&mut self, plugin: Box<dyn SitePlugin>) {
        debug!(plugin = plugin.name(), "Registered site plugin");
        self.plugins.push(plugin);
    }

    /// Registered plugin names.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Run `on_files` through every plugin.
    pub fn run_on_files(&self, files: Files, config: &SiteConfig) -> Result<Files, PluginError> {
        self.plugins.iter().try_fold(files, |files, plugin| {
            plugin
                .on_files(files, config)
                .map_err(|source| hook_error(plugin.as_ref(), "on_files", source))
        })
    }

    /// Ask plugins for a source override; the first answer wins.
    pub fn run_on_page_read_source(
        &self,
        page: &Page,
        config: &SiteConfig,
    ) -> Result<Option<String>, PluginError> {
        for plugin in &self.plugins {
            let source = plugin
                .on_page_read_source(page, config)
                .map_err(|source| hook_error(plugin.as_ref(), "on_page_read_source", source))?;
            if source.is_some() {
                return Ok(source);
            }
        }
        Ok(None)
    }

    /// Run `on_page_markdown` through every plugin.
    pub fn run_on_page_markdown(
        &self,
        markdown: String,
        page: &Page,
        config: &SiteConfig,
        files: &mut Files,
    ) -> Result<String, PluginError> {
        self.plugins.iter().try_fold(markdown, |markdown, plugin| {
            plugin
                .on_page_markdown(markdown, page, config, files)
                .map_err(|source| hook_error(plugin.as_ref(), "on_page_markdown", source))
        })
    }
}

fn hook_error(plugin: &dyn SitePlugin, event: &'static str, source: HookError) -> PluginError {
    PluginError::Hook {
        plugin: plugin.name().to_string(),
        event,
        source,
    }
}
