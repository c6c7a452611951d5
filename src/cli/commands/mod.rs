//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod generate;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;
use crate::document::DOCUMENT_FILENAME;

#[derive(Parser)]
#[command(name = "quizscribe")]
#[command(about = "Generate study questions and answers from photographed pages")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./quizscribe.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web interface
    Serve {
        /// Bind address (port, host, or host:port)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run the whole pipeline on an image and write the document
    Run {
        /// Image to process (.jpg, .jpeg or .png)
        image: PathBuf,

        /// Where to write the .docx
        #[arg(short, long, default_value = DOCUMENT_FILENAME)]
        output: PathBuf,
    },

    /// Extract text from an image and print it
    Ocr {
        /// Image to read
        image: PathBuf,
    },

    /// Check OCR and language model configuration
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Run { image, output } => generate::cmd_run(&settings, &image, &output).await,
        Commands::Ocr { image } => generate::cmd_ocr(&settings, &image).await,
        Commands::Check => check::cmd_check(&settings).await,
    }
}
