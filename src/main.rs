//! lesson-pages CLI
//!
//! Paginates a static HTML document with the native flow renderer and writes
//! either the page chunks as JSON or a print-ready HTML document. The main
//! interface is through the WASM bindings.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lesson_pages::{PaginationConfig, Paginator, PrintDocument};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Output format
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Page chunks as a JSON array of `{ pageNumber, html }`
    #[default]
    Json,
    /// Standalone HTML laid out at physical page size
    Print,
}

#[derive(Parser)]
#[command(name = "lesson-pages")]
#[command(version)]
#[command(about = "Split lesson HTML into A4 pages", long_about = None)]
struct Cli {
    /// HTML document to paginate
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// JSON pagination config (page size, margins, typography)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            PaginationConfig::from_json(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => PaginationConfig::default(),
    };

    let html = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let chunks = Paginator::with_config(&config)
        .paginate(&html)
        .context("Pagination failed")?;
    info!(pages = chunks.len(), input = %cli.input.display(), "paginated");

    let rendered = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&chunks)?,
        OutputFormat::Print => {
            PrintDocument::new(&chunks, config.dimensions, &config.typography).to_html()
        }
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}
