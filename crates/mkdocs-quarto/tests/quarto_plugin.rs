/*
 * tests/quarto_plugin.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for the Quarto site plugin.
 */

//! Integration tests for the Quarto site plugin.
//!
//! A figure-emitting renderer stands in for Quarto so that side artifacts,
//! workspace cleanup and notebook conversion can be checked exactly.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mkdocs_quarto::{
    File, Files, Page, PluginCollection, PluginError, QuartoPlugin, QuartoPluginConfig,
    SiteConfig,
};
use quarto_render_bridge::{
    BridgeError, ConvertInvocation, RenderInvocation, RenderSettings, Renderer, find_quarto,
};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

/// Renderer that prefixes the document and writes a figure next to it.
#[derive(Default)]
struct FigureRenderer {
    fail: bool,
    renders: AtomicUsize,
    seen_names: Mutex<Vec<(String, String)>>,
    seen_workspace: Mutex<Option<PathBuf>>,
}

impl FigureRenderer {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn record(&self, workspace: &Path, input: &str, output: &str) {
        *self.seen_workspace.lock().unwrap() = Some(workspace.to_path_buf());
        self.seen_names
            .lock()
            .unwrap()
            .push((input.to_string(), output.to_string()));
    }
}

impl Renderer for FigureRenderer {
    fn name(&self) -> &str {
        "figures"
    }

    fn render(&self, invocation: &RenderInvocation<'_>) -> quarto_render_bridge::Result<()> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        self.record(invocation.workspace, invocation.input, invocation.output);
        if self.fail {
            return Err(BridgeError::renderer_failed("render", 1, "Execution halted"));
        }

        let input = std::fs::read_to_string(invocation.input_path())?;
        let stem = invocation.output.trim_end_matches(".md");
        let figures = invocation
            .workspace
            .join(format!("{}_files", stem))
            .join("figure-gfm");
        std::fs::create_dir_all(&figures)?;
        std::fs::write(figures.join("plot-1.png"), PNG_BYTES)?;
        std::fs::write(
            invocation.output_path(),
            format!(
                "rendered:{}\n![](./{}_files/figure-gfm/plot-1.png)\n",
                input, stem
            ),
        )?;
        Ok(())
    }

    fn convert(&self, invocation: &ConvertInvocation<'_>) -> quarto_render_bridge::Result<()> {
        self.record(invocation.workspace, invocation.input, invocation.output);
        if self.fail {
            return Err(BridgeError::renderer_failed("convert", 1, "Invalid notebook"));
        }

        let input = std::fs::read_to_string(invocation.input_path())?;
        std::fs::write(invocation.output_path(), format!("# Converted\n\n{}", input))?;
        Ok(())
    }
}

fn plugin_with(renderer: Arc<FigureRenderer>) -> QuartoPlugin {
    QuartoPlugin::new(QuartoPluginConfig::default(), renderer)
}

fn site_config(docs: &Path, site: &Path) -> SiteConfig {
    SiteConfig {
        docs_dir: docs.to_path_buf(),
        site_dir: site.to_path_buf(),
        ..SiteConfig::default()
    }
}

fn site_files(paths: &[&str], config: &SiteConfig) -> Files {
    paths
        .iter()
        .map(|p| {
            File::new(
                p,
                Some(config.docs_dir.as_path()),
                &config.site_dir,
                config.use_directory_urls,
            )
        })
        .collect()
}

// ============================================================================
// on_files
// ============================================================================

#[test]
fn test_on_files_classifies_quarto_sources() {
    let config = site_config(Path::new("docs"), Path::new("site"));
    let files = site_files(
        &[
            "guide/intro.qmd",
            "notebooks/analysis.ipynb",
            "index.md",
            "img/logo.png",
        ],
        &config,
    );

    let mut plugins = PluginCollection::new();
    plugins.register(Box::new(plugin_with(Arc::default())));
    let files = plugins.run_on_files(files, &config).unwrap();

    let intro = files.get_file_from_path("guide/intro.qmd").unwrap();
    assert_eq!(intro.dest_uri(), "guide/intro.html");
    assert_eq!(intro.url(), "guide/intro.html");
    assert_eq!(intro.abs_dest_path(), Path::new("site/guide/intro.html"));
    assert!(intro.is_documentation_page());

    let notebook = files.get_file_from_path("notebooks/analysis.ipynb").unwrap();
    assert_eq!(notebook.dest_uri(), "notebooks/analysis.html");
    assert!(notebook.is_documentation_page());

    let index = files.get_file_from_path("index.md").unwrap();
    assert_eq!(index.dest_uri(), "index.html");

    let logo = files.get_file_from_path("img/logo.png").unwrap();
    assert_eq!(logo.dest_uri(), "img/logo.png");
    assert!(!logo.is_documentation_page());

    assert_eq!(files.documentation_pages().len(), 3);
}

// ============================================================================
// on_page_read_source
// ============================================================================

#[test]
fn test_notebook_source_is_converted() {
    let docs = tempfile::tempdir().unwrap();
    std::fs::write(docs.path().join("analysis.ipynb"), "{\"cells\": []}").unwrap();
    let config = site_config(docs.path(), Path::new("site"));

    let renderer = Arc::new(FigureRenderer::default());
    let mut plugins = PluginCollection::new();
    plugins.register(Box::new(plugin_with(Arc::clone(&renderer))));

    let files = site_files(&["analysis.ipynb"], &config);
    let mut page = Page::new(files.iter().next().unwrap().clone());
    page.read_source(&plugins, &config).unwrap();

    assert_eq!(page.markdown.as_deref(), Some("# Converted\n\n{\"cells\": []}"));
    assert_eq!(
        renderer.seen_names.lock().unwrap().as_slice(),
        &[("analysis.ipynb".to_string(), "analysis.md".to_string())]
    );
}

#[test]
fn test_other_sources_are_read_from_disk() {
    let docs = tempfile::tempdir().unwrap();
    std::fs::write(docs.path().join("intro.qmd"), "# Intro\n").unwrap();
    let config = site_config(docs.path(), Path::new("site"));

    let renderer = Arc::new(FigureRenderer::default());
    let mut plugins = PluginCollection::new();
    plugins.register(Box::new(plugin_with(Arc::clone(&renderer))));

    let files = site_files(&["intro.qmd"], &config);
    let mut page = Page::new(files.iter().next().unwrap().clone());
    page.read_source(&plugins, &config).unwrap();

    assert_eq!(page.markdown.as_deref(), Some("# Intro\n"));
    assert!(renderer.seen_names.lock().unwrap().is_empty());
}

#[test]
fn test_notebook_without_source_path_is_host_error() {
    let plugin = plugin_with(Arc::default());
    let page = Page::new(File::new("analysis.ipynb", None, Path::new("site"), true));

    let err = plugin.read_notebook(&page).unwrap_err();
    assert!(matches!(err, BridgeError::HostApi(_)));
}

#[test]
fn test_notebook_conversion_failure_surfaces() {
    let docs = tempfile::tempdir().unwrap();
    std::fs::write(docs.path().join("broken.ipynb"), "not json").unwrap();
    let config = site_config(docs.path(), Path::new("site"));

    let mut plugins = PluginCollection::new();
    plugins.register(Box::new(plugin_with(Arc::new(FigureRenderer::failing()))));

    let files = site_files(&["broken.ipynb"], &config);
    let mut page = Page::new(files.iter().next().unwrap().clone());
    let err = page.read_source(&plugins, &config).unwrap_err();

    let PluginError::Hook { plugin, event, source } = err else {
        panic!("expected a hook error");
    };
    assert_eq!(plugin, "quarto");
    assert_eq!(event, "on_page_read_source");
    let bridge = source.downcast_ref::<BridgeError>().unwrap();
    assert!(bridge.is_renderer_failure());
    assert!(page.markdown.is_none());
}

// ============================================================================
// on_page_markdown
// ============================================================================

#[test]
fn test_quarto_page_is_rendered_and_artifacts_published() {
    let site = tempfile::tempdir().unwrap();
    let config = site_config(Path::new("docs"), site.path());
    let renderer = Arc::new(FigureRenderer::default());
    let plugin = plugin_with(Arc::clone(&renderer));

    let mut files = site_files(&["intro.qmd"], &config);
    let page = Page::new(files.iter().next().unwrap().clone());
    let cwd_before = std::env::current_dir().unwrap();

    let markdown = plugin
        .render_page("# Intro\n".to_string(), &page, &config, &mut files)
        .unwrap();

    assert_eq!(
        markdown,
        "rendered:# Intro\n\n![](./intro_files/figure-gfm/plot-1.png)\n"
    );
    assert_eq!(std::env::current_dir().unwrap(), cwd_before);
    assert_eq!(
        renderer.seen_names.lock().unwrap().as_slice(),
        &[("intro.qmd.qmd".to_string(), "intro.md".to_string())]
    );

    let published = site.path().join("intro_files/figure-gfm/plot-1.png");
    assert_eq!(std::fs::read(&published).unwrap(), PNG_BYTES);

    let artifact = files
        .get_file_from_path("intro_files/figure-gfm/plot-1.png")
        .unwrap();
    assert_eq!(artifact.src_dir.as_deref(), Some(site.path()));
    assert_eq!(artifact.dest_dir, site.path());
    assert_eq!(artifact.abs_dest_path(), published);
    assert!(!artifact.is_documentation_page());
    assert_eq!(files.len(), 2);

    let workspace = renderer.seen_workspace.lock().unwrap().clone().unwrap();
    assert!(!workspace.exists());
}

#[test]
fn test_nested_page_artifacts_resolve_from_page() {
    let site = tempfile::tempdir().unwrap();
    let config = site_config(Path::new("docs"), site.path());
    let mut plugins = PluginCollection::new();
    plugins.register(Box::new(plugin_with(Arc::default())));

    let files = site_files(&["guide/plots.qmd"], &config);
    let mut files = plugins.run_on_files(files, &config).unwrap();
    let page = Page::new(files.get_file_from_path("guide/plots.qmd").unwrap().clone());
    assert_eq!(page.file.dest_uri(), "guide/plots.html");

    let markdown = plugins
        .run_on_page_markdown("# Plots\n".to_string(), &page, &config, &mut files)
        .unwrap();

    let link = markdown
        .lines()
        .find_map(|line| line.strip_prefix("![](./")?.strip_suffix(')'))
        .unwrap();
    let page_dir = page.file.dest_uri().rsplit_once('/').unwrap().0;
    let target = format!("{}/{}", page_dir, link);
    assert_eq!(target, "guide/plots_files/figure-gfm/plot-1.png");

    assert_eq!(std::fs::read(site.path().join(&target)).unwrap(), PNG_BYTES);
    let artifact = files.get_file_from_path(&target).unwrap();
    assert_eq!(artifact.dest_uri(), target);
    assert_eq!(artifact.abs_dest_path(), site.path().join(&target));
    assert!(!site.path().join("plots_files").exists());
}

#[test]
fn test_rendering_twice_does_not_duplicate_artifacts() {
    let site = tempfile::tempdir().unwrap();
    let config = site_config(Path::new("docs"), site.path());
    let plugin = plugin_with(Arc::default());

    let mut files = site_files(&["intro.qmd"], &config);
    let page = Page::new(files.iter().next().unwrap().clone());

    plugin
        .render_page("a".to_string(), &page, &config, &mut files)
        .unwrap();
    plugin
        .render_page("b".to_string(), &page, &config, &mut files)
        .unwrap();

    assert_eq!(files.len(), 2);
}

#[test]
fn test_non_quarto_page_is_unchanged() {
    let site = tempfile::tempdir().unwrap();
    let config = site_config(Path::new("docs"), site.path());
    let renderer = Arc::new(FigureRenderer::default());
    let plugin = plugin_with(Arc::clone(&renderer));

    let mut files = site_files(&["index.md"], &config);
    let page = Page::new(files.iter().next().unwrap().clone());

    let markdown = plugin
        .render_page("# Home\n".to_string(), &page, &config, &mut files)
        .unwrap();

    assert_eq!(markdown, "# Home\n");
    assert_eq!(renderer.renders.load(Ordering::SeqCst), 0);
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read_dir(site.path()).unwrap().count(), 0);
}

#[test]
fn test_render_failure_publishes_nothing() {
    let site = tempfile::tempdir().unwrap();
    let config = site_config(Path::new("docs"), site.path());
    let renderer = Arc::new(FigureRenderer::failing());
    let mut plugins = PluginCollection::new();
    plugins.register(Box::new(plugin_with(Arc::clone(&renderer))));

    let mut files = site_files(&["intro.qmd"], &config);
    let page = Page::new(files.iter().next().unwrap().clone());

    let err = plugins
        .run_on_page_markdown("# Intro\n".to_string(), &page, &config, &mut files)
        .unwrap_err();

    assert!(err.to_string().contains("Execution halted"));
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read_dir(site.path()).unwrap().count(), 0);
    let workspace = renderer.seen_workspace.lock().unwrap().clone().unwrap();
    assert!(!workspace.exists());
}

// ============================================================================
// Whole build
// ============================================================================

#[test]
fn test_site_build_flow() {
    let docs = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(docs.path().join("guide")).unwrap();
    std::fs::write(docs.path().join("index.md"), "# Home\n").unwrap();
    std::fs::write(docs.path().join("guide/plots.qmd"), "# Plots\n").unwrap();
    std::fs::write(docs.path().join("guide/nb.ipynb"), "{}").unwrap();
    let config = site_config(docs.path(), site.path());

    let mut plugins = PluginCollection::new();
    plugins.register(Box::new(plugin_with(Arc::default())));

    let files = site_files(&["index.md", "guide/plots.qmd", "guide/nb.ipynb"], &config);
    let mut files = plugins.run_on_files(files, &config).unwrap();

    let pages: Vec<File> = files.documentation_pages().into_iter().cloned().collect();
    let mut built = Vec::new();
    for file in pages {
        let mut page = Page::new(file);
        page.read_source(&plugins, &config).unwrap();
        let markdown = page.markdown.clone().unwrap_or_default();
        let markdown = plugins
            .run_on_page_markdown(markdown, &page, &config, &mut files)
            .unwrap();
        built.push((page.file.src_uri.clone(), markdown));
    }

    assert_eq!(built[0], ("index.md".to_string(), "# Home\n".to_string()));
    assert!(built[1].1.starts_with("rendered:# Plots\n"));
    assert!(built[2].1.starts_with("rendered:# Converted\n\n{}"));

    assert!(site.path().join("guide/plots_files/figure-gfm/plot-1.png").exists());
    assert!(site.path().join("guide/nb_files/figure-gfm/plot-1.png").exists());
    assert!(files.get_file_from_path("guide/plots_files/figure-gfm/plot-1.png").is_some());
    assert!(files.get_file_from_path("guide/nb_files/figure-gfm/plot-1.png").is_some());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_load_rejects_invalid_config() {
    let site = SiteConfig::from_yaml("plugins:\n  quarto:\n    quiet: sometimes\n").unwrap();

    let err = QuartoPlugin::load(&site).err().unwrap();
    assert!(matches!(err, PluginError::Config { ref plugin, .. } if plugin == "quarto"));
}

#[test]
fn test_plugin_keeps_render_settings() {
    let config = QuartoPluginConfig {
        render: RenderSettings::default().with_output_format("commonmark"),
        ..QuartoPluginConfig::default()
    };
    let plugin = QuartoPlugin::new(config, Arc::new(FigureRenderer::default()));

    assert_eq!(plugin.config().render.output_format, "commonmark");
    assert_eq!(plugin.config().foo, "a default value");
}

#[test]
#[ignore = "requires quarto"]
fn test_load_with_real_quarto() {
    if find_quarto().is_none() {
        eprintln!("quarto not found, skipping test");
        return;
    }

    let site = SiteConfig::from_yaml("plugins:\n  quarto: {}\n").unwrap();
    let plugin = QuartoPlugin::load(&site).unwrap();
    assert_eq!(plugin.config(), &QuartoPluginConfig::default());
}
