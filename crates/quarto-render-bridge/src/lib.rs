/*
 * quarto-render-bridge
 * Copyright (c) 2025 Posit, PBC
 *
 * Invoke the Quarto CLI from documentation toolchains.
 */

//! Invoke the Quarto CLI from documentation toolchains.
//!
//! This crate holds everything the host adapters share:
//!
//! - [`Renderer`] - the seam between adapters and Quarto
//! - [`QuartoCli`] - renderer that shells out to the `quarto` binary
//! - [`RenderWorkspace`] - per-call temporary directory
//! - [`render_document`] / [`convert_notebook`] - the two operations
//! - [`RenderSettings`] - configuration adapters embed in their own config
//!
//! # Example
//!
//! ```ignore
//! use quarto_render_bridge::{DocumentNames, QuartoCli, RenderSettings, render_document};
//!
//! let quarto = QuartoCli::discover()?;
//! let rendered = render_document(
//!     &quarto,
//!     "# Hello\n",
//!     &DocumentNames::default(),
//!     &RenderSettings::default(),
//! )?;
//! println!("{}", rendered.markdown);
//! ```

mod error;
mod quarto;
mod render;
mod renderer;
mod settings;
mod workspace;

pub use error::{BridgeError, Result};
pub use quarto::{QUARTO_PATH_ENV, QuartoCli, find_quarto};
pub use render::{DocumentNames, RenderedDocument, convert_notebook, render_document};
pub use renderer::{ConvertInvocation, RenderInvocation, Renderer};
pub use settings::{DEFAULT_OUTPUT_FORMAT, RenderSettings};
pub use workspace::{RenderWorkspace, SideArtifact};
