/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * quarto-bridge command-line entry point.
 */

//! quarto-bridge - render Quarto documents and notebooks to Markdown.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use quarto_render_bridge::{DEFAULT_OUTPUT_FORMAT, RenderSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "quarto-bridge")]
#[command(version)]
#[command(about = "Render Quarto documents and notebooks to Markdown", long_about = None)]
struct Cli {
    /// Path to the quarto binary (defaults to $QUARTO_PATH, then PATH)
    #[arg(long, global = true, value_name = "PATH")]
    quarto: Option<PathBuf>,

    /// Markdown dialect quarto should emit
    #[arg(short = 't', long, global = true, default_value = DEFAULT_OUTPUT_FORMAT)]
    to: String,

    /// Pass --quiet to quarto and suppress progress messages
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn settings(&self) -> RenderSettings {
        RenderSettings::default()
            .with_quarto_path(self.quarto.clone())
            .with_output_format(self.to.clone())
            .with_quiet(self.quiet)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Markdown document through the Quarto preprocessor
    Render {
        /// Input document
        input: PathBuf,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Convert the rendered Markdown to HTML
        #[arg(long)]
        html: bool,
    },

    /// Convert a Jupyter notebook to Markdown
    Convert {
        /// Notebook to convert
        notebook: PathBuf,

        /// Write output to FILE instead of stdout
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Report the quarto binary in use and its version
    Check,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries rendered documents.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quarto_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();

    match cli.command {
        Commands::Render {
            input,
            output,
            html,
        } => commands::render::execute(
            commands::render::RenderArgs {
                input,
                output,
                html,
            },
            settings,
        ),
        Commands::Convert { notebook, output } => commands::convert::execute(
            commands::convert::ConvertArgs { notebook, output },
            &settings,
        ),
        Commands::Check => commands::check::execute(&settings),
    }
}
