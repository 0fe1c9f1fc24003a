/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for Quarto invocations.
 */

//! Error types for Quarto invocations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering or converting through Quarto.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No Quarto binary could be located.
    #[error("Quarto not found: set QUARTO_PATH or add quarto to PATH")]
    QuartoNotFound,

    /// The Quarto process could not be started.
    #[error("Failed to spawn {}: {source}", program.display())]
    Spawn {
        /// The program that failed to start
        program: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Quarto ran but exited unsuccessfully.
    #[error("quarto {action} failed (exit {code}): {stderr}")]
    RendererFailed {
        /// The subcommand that failed ("render", "convert", ...)
        action: String,
        /// Exit code, or -1 when terminated by a signal
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The renderer finished but never produced the declared output file.
    #[error("Renderer produced no output file: {}", path.display())]
    OutputMissing {
        /// The expected output path
        path: PathBuf,
    },

    /// The output file exists but could not be read as UTF-8 text.
    #[error("Failed to read rendered output {}: {source}", path.display())]
    OutputUnreadable {
        /// The output path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A host framework handed us something we cannot work with.
    #[error("Host API misuse: {0}")]
    HostApi(String),

    /// Failed to create or tear down a temporary workspace.
    #[error("Workspace error: {message}")]
    Workspace {
        /// Description of what failed
        message: String,
        /// The path involved, if any
        path: Option<PathBuf>,
    },

    /// IO error outside the workspace.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create a "renderer failed" error.
    pub fn renderer_failed(
        action: impl Into<String>,
        code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::RendererFailed {
            action: action.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a "host API misuse" error.
    pub fn host_api(message: impl Into<String>) -> Self {
        Self::HostApi(message.into())
    }

    /// Create a workspace error.
    pub fn workspace(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Workspace {
            message: message.into(),
            path,
        }
    }

    /// Whether the error came from the external renderer itself
    /// (as opposed to the filesystem or the host).
    pub fn is_renderer_failure(&self) -> bool {
        matches!(
            self,
            Self::QuartoNotFound | Self::Spawn { .. } | Self::RendererFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
