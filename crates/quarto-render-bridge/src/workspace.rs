/*
 * workspace.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-call temporary workspace for Quarto invocations.
 */

//! Per-call temporary workspace.
//!
//! A [`RenderWorkspace`] is a fresh temporary directory holding exactly one
//! declared input file and one declared output file name. Anything else the
//! renderer writes there (figures, data files) is a side artifact. The
//! directory is removed when the workspace is dropped, whether or not the
//! render succeeded.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{BridgeError, Result};

/// Prefix for workspace directories under the system temp dir.
const WORKSPACE_PREFIX: &str = "quarto-bridge-";

/// A file the renderer emitted besides the declared output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideArtifact {
    /// Path relative to the workspace root.
    pub relative_path: PathBuf,
    /// File contents, captured before the workspace is removed.
    pub contents: Vec<u8>,
}

/// Temporary directory for a single render or convert call.
#[derive(Debug)]
pub struct RenderWorkspace {
    dir: TempDir,
    input_name: String,
    output_name: String,
}

impl RenderWorkspace {
    /// Create a workspace with the given input and output file names.
    ///
    /// Both names must be plain file names; nested paths are rejected.
    pub fn create(input_name: impl Into<String>, output_name: impl Into<String>) -> Result<Self> {
        let input_name = input_name.into();
        let output_name = output_name.into();
        validate_file_name(&input_name)?;
        validate_file_name(&output_name)?;
        if input_name == output_name {
            return Err(BridgeError::host_api(format!(
                "input and output share the name '{}'",
                input_name
            )));
        }

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .map_err(|e| {
                BridgeError::workspace(format!("Failed to create temp directory: {}", e), None)
            })?;

        debug!(path = %dir.path().display(), "Created render workspace");

        Ok(Self {
            dir,
            input_name,
            output_name,
        })
    }

    /// Workspace root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Declared input file name.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Declared output file name.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Absolute path of the input file.
    pub fn input_path(&self) -> PathBuf {
        self.path().join(&self.input_name)
    }

    /// Absolute path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.path().join(&self.output_name)
    }

    /// Write `contents` to the input file as UTF-8.
    pub fn write_input(&self, contents: &str) -> Result<()> {
        let path = self.input_path();
        std::fs::write(&path, contents).map_err(|e| {
            BridgeError::workspace(format!("Failed to write input file: {}", e), Some(path))
        })
    }

    /// Copy an existing file into the workspace as the input file.
    pub fn copy_input_from(&self, source: &Path) -> Result<()> {
        std::fs::copy(source, self.input_path())?;
        Ok(())
    }

    /// Read the output file the renderer was asked to produce.
    pub fn read_output(&self) -> Result<String> {
        let path = self.output_path();
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BridgeError::OutputMissing { path }
            } else {
                BridgeError::OutputUnreadable { path, source }
            }
        })
    }

    /// Collect every regular file other than the declared input and output.
    ///
    /// Results are sorted by relative path.
    pub fn side_artifacts(&self) -> Result<Vec<SideArtifact>> {
        let root = self.path();
        let input = self.input_path();
        let output = self.output_path();
        let mut artifacts = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                BridgeError::workspace(
                    format!("Failed to walk workspace: {}", e),
                    e.path().map(Path::to_path_buf),
                )
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path == input || path == output {
                continue;
            }

            let relative_path = path
                .strip_prefix(root)
                .map_err(|_| {
                    BridgeError::workspace(
                        "Side artifact outside workspace",
                        Some(path.to_path_buf()),
                    )
                })?
                .to_path_buf();
            let contents = std::fs::read(path)?;

            debug!(artifact = %relative_path.display(), bytes = contents.len(), "Found side artifact");
            artifacts.push(SideArtifact {
                relative_path,
                contents,
            });
        }

        Ok(artifacts)
    }

    /// Remove the workspace, reporting failure instead of ignoring it.
    pub fn close(self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.dir.close().map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to remove render workspace");
            BridgeError::workspace(format!("Failed to remove temp directory: {}", e), Some(path))
        })
    }
}

/// Reject empty names and names with path components.
fn validate_file_name(name: &str) -> Result<()> {
    let is_plain = !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);

    if is_plain {
        Ok(())
    } else {
        Err(BridgeError::host_api(format!(
            "'{}' is not a plain file name",
            name
        )))
    }
}
