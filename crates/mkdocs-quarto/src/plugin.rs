/*
 * plugin.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Site plugin that renders Quarto pages and notebooks.
 */

//! Site plugin that renders Quarto pages and notebooks.

use std::path::{Component, Path};
use std::sync::Arc;

use quarto_render_bridge::{
    BridgeError, DocumentNames, QuartoCli, RenderSettings, Renderer, Result, SideArtifact,
    convert_notebook, render_document,
};
use serde::Deserialize;
use tracing::debug;

use crate::site::{File, Files, HookError, Page, PluginError, SiteConfig, SitePlugin};

/// Name of the plugin and of its block in the site configuration.
pub const PLUGIN_NAME: &str = "quarto";

/// Source suffixes rendered through Quarto.
pub const QUARTO_SUFFIXES: &[&str] = &[".qmd", ".ipynb"];

const NOTEBOOK_SUFFIX: &str = ".ipynb";

/// Whether the file at `src_uri` is rendered through Quarto.
pub fn is_quarto_page(src_uri: &str) -> bool {
    QUARTO_SUFFIXES
        .iter()
        .any(|suffix| src_uri.ends_with(suffix))
}

/// Plugin configuration block.
///
/// ```yaml
/// plugins:
///   quarto:
///     output_format: gfm
///     quiet: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuartoPluginConfig {
    /// Placeholder option; not read by any hook.
    pub foo: String,

    /// How Quarto is invoked.
    #[serde(flatten)]
    pub render: RenderSettings,
}

impl Default for QuartoPluginConfig {
    fn default() -> Self {
        Self {
            foo: "a default value".to_string(),
            render: RenderSettings::default(),
        }
    }
}

/// Renders `.qmd` pages and `.ipynb` notebooks during a site build.
pub struct QuartoPlugin {
    config: QuartoPluginConfig,
    renderer: Arc<dyn Renderer>,
}

impl QuartoPlugin {
    /// Create a plugin around an existing renderer.
    pub fn new(config: QuartoPluginConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self { config, renderer }
    }

    /// Create a plugin using the quarto binary selected by `config`.
    pub fn from_config(config: QuartoPluginConfig) -> Result<Self> {
        let cli = QuartoCli::from_settings(&config.render)?;
        Ok(Self::new(config, Arc::new(cli)))
    }

    /// Create a plugin from the `quarto` block of a site configuration.
    pub fn load(site: &SiteConfig) -> std::result::Result<Self, PluginError> {
        let config: QuartoPluginConfig = site.plugin_config(PLUGIN_NAME)?;
        Self::from_config(config).map_err(|source| PluginError::Setup {
            plugin: PLUGIN_NAME.to_string(),
            source: Box::new(source),
        })
    }

    /// The plugin's configuration.
    pub fn config(&self) -> &QuartoPluginConfig {
        &self.config
    }

    /// Give every Quarto source an `.html` destination next to it and
    /// build it as a page.
    pub fn classify_files(&self, mut files: Files) -> Files {
        for file in files.iter_mut() {
            if !is_quarto_page(&file.src_uri) {
                continue;
            }
            let dest_uri = html_dest_uri(file.dest_uri());
            debug!(src = %file.src_uri, dest = %dest_uri, "Classified Quarto page");
            file.set_dest_uri(dest_uri);
            file.set_documentation_page(true);
        }
        files
    }

    /// Markdown for a notebook page, or `None` for any other page.
    pub fn read_notebook(&self, page: &Page) -> Result<Option<String>> {
        if !page.file.src_uri.ends_with(NOTEBOOK_SUFFIX) {
            return Ok(None);
        }

        let path = page.file.abs_src_path().ok_or_else(|| {
            BridgeError::host_api(format!(
                "notebook page '{}' has no source path",
                page.file.src_uri
            ))
        })?;
        convert_notebook(self.renderer.as_ref(), &path).map(Some)
    }

    /// Render a Quarto page's Markdown and publish its side artifacts.
    ///
    /// Artifacts are published under the page's own directory so that
    /// links relative to the page resolve. Pages that are not Quarto
    /// sources are returned unchanged.
    pub fn render_page(
        &self,
        markdown: String,
        page: &Page,
        config: &SiteConfig,
        files: &mut Files,
    ) -> Result<String> {
        if !is_quarto_page(&page.file.src_uri) {
            return Ok(markdown);
        }

        let (page_dir, basename) = match page.file.src_uri.rsplit_once('/') {
            Some((dir, basename)) => (dir, basename),
            None => ("", page.file.src_uri.as_str()),
        };
        let names = DocumentNames::new(
            format!("{}.qmd", basename),
            format!("{}.md", page.file.name),
        );

        let rendered = render_document(
            self.renderer.as_ref(),
            &markdown,
            &names,
            &self.config.render,
        )?;
        debug!(page = %page.file.src_uri, markdown = %rendered.markdown, "Rendered Quarto page");

        for artifact in &rendered.artifacts {
            let file = publish_artifact(artifact, page_dir, config)?;
            files.append(file);
        }

        Ok(rendered.markdown)
    }
}

/// Write `artifact` under `page_dir` in the site directory and describe it
/// as a site file.
fn publish_artifact(
    artifact: &SideArtifact,
    page_dir: &str,
    config: &SiteConfig,
) -> Result<File> {
    let relative = artifact_uri(&artifact.relative_path)?;
    let uri = if page_dir.is_empty() {
        relative
    } else {
        format!("{}/{}", page_dir, relative)
    };
    let dest = config.site_dir.join(&uri);

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&dest, &artifact.contents)?;
    debug!(artifact = %uri, dest = %dest.display(), "Copied side artifact");

    Ok(File::new(
        uri,
        Some(config.site_dir.as_path()),
        &config.site_dir,
        config.use_directory_urls,
    ))
}

/// `/`-separated URI for a workspace-relative path.
fn artifact_uri(path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => {
                return Err(BridgeError::workspace(
                    "side artifact escapes the workspace",
                    Some(path.to_path_buf()),
                ));
            }
        }
    }
    Ok(parts.join("/"))
}

/// `<dir>/<stem>.html` for a destination URI.
fn html_dest_uri(dest_uri: &str) -> String {
    let (dir, file) = match dest_uri.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, dest_uri),
    };
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file);

    match dir {
        Some(dir) => format!("{}/{}.html", dir, stem),
        None => format!("{}.html", stem),
    }
}

impl SitePlugin for QuartoPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn on_files(&self, files: Files, _config: &SiteConfig) -> std::result::Result<Files, HookError> {
        Ok(self.classify_files(files))
    }

    fn on_page_read_source(
        &self,
        page: &Page,
        _config: &SiteConfig,
    ) -> std::result::Result<Option<String>, HookError> {
        Ok(self.read_notebook(page)?)
    }

    fn on_page_markdown(
        &self,
        markdown: String,
        page: &Page,
        config: &SiteConfig,
        files: &mut Files,
    ) -> std::result::Result<String, HookError> {
        Ok(self.render_page(markdown, page, config, files)?)
    }
}
